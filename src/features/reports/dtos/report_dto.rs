use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::reports::models::Report;

/// Upload report request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadReportDto {
    /// The report file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Id of the section the report belongs to
    #[schema(example = 5)]
    pub section_id: i32,
    /// Id of the user uploading the report
    #[schema(example = 1)]
    pub user_id: i32,
}

/// Response DTO for report metadata
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponseDto {
    /// Unique identifier for the report
    pub id: i32,
    /// Original filename as uploaded
    pub file_name: String,
    /// Publicly resolvable URL of the stored file
    pub file_path: String,
    /// Timestamp when the report was uploaded
    pub upload_date: DateTime<Utc>,
    /// Id of the owning section
    pub section_id: i32,
    /// Id of the owning user
    pub user_id: i32,
}

impl From<Report> for ReportResponseDto {
    fn from(report: Report) -> Self {
        Self {
            id: report.id,
            file_name: report.file_name,
            file_path: report.file_path,
            upload_date: report.upload_date,
            section_id: report.section_id,
            user_id: report.user_id,
        }
    }
}

/// Response DTO for report delete operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteReportResponseDto {
    /// Confirmation that the report was deleted
    pub deleted: bool,
}
