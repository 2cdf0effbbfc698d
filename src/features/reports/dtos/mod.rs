mod report_dto;

pub use report_dto::{DeleteReportResponseDto, ReportResponseDto, UploadReportDto};
