pub mod images;
pub mod reports;
pub mod sections;
pub mod users;
