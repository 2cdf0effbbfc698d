mod report;

pub use report::{NewReport, Report};
