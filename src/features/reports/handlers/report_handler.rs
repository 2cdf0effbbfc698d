use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::features::reports::dtos::{
    DeleteReportResponseDto, ReportResponseDto, UploadReportDto,
};
use crate::features::reports::services::ReportService;
use crate::shared::constants::{is_mime_type_allowed, ALLOWED_MIME_TYPES, MAX_FILE_SIZE};
use crate::shared::types::{ApiResponse, Meta};

/// Upload a report file
///
/// Accepts multipart/form-data with:
/// - `file`: The report file to upload (required)
/// - `sectionId`: Id of the owning section (required)
/// - `userId`: Id of the uploading user (required)
#[utoipa::path(
    post,
    path = "/MeausrePro/report/upload",
    tag = "reports",
    request_body(
        content = UploadReportDto,
        content_type = "multipart/form-data",
        description = "Report upload form with owning section and user ids",
    ),
    responses(
        (status = 200, description = "Report uploaded successfully", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Invalid file or missing field"),
        (status = 404, description = "Section or user does not exist"),
        (status = 502, description = "Object store unavailable")
    )
)]
pub async fn upload_report(
    State(service): State<Arc<ReportService>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut section_id: Option<i32> = None;
    let mut user_id: Option<i32> = None;

    // Process multipart fields
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let ct = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());

                let fname = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                file_data = Some(data.to_vec());
                file_name = Some(fname);
                content_type = Some(ct);
            }
            "sectionId" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read sectionId field: {}", e))
                })?;
                section_id = Some(text.parse::<i32>().map_err(|_| {
                    AppError::BadRequest(format!("sectionId must be an integer, got '{}'", text))
                })?);
            }
            "userId" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read userId field: {}", e))
                })?;
                user_id = Some(text.parse::<i32>().map_err(|_| {
                    AppError::BadRequest(format!("userId must be an integer, got '{}'", text))
                })?);
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    // Validate required fields
    let file_data =
        file_data.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;
    let file_name =
        file_name.ok_or_else(|| AppError::BadRequest("Filename is required".to_string()))?;
    let content_type =
        content_type.ok_or_else(|| AppError::BadRequest("Content type is required".to_string()))?;
    let section_id =
        section_id.ok_or_else(|| AppError::BadRequest("sectionId is required".to_string()))?;
    let user_id =
        user_id.ok_or_else(|| AppError::BadRequest("userId is required".to_string()))?;

    if file_data.len() > MAX_FILE_SIZE {
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size is {} bytes ({} MB)",
            MAX_FILE_SIZE,
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    if !is_mime_type_allowed(&content_type) {
        return Err(AppError::BadRequest(format!(
            "File type '{}' is not allowed. Allowed types: {}",
            content_type,
            ALLOWED_MIME_TYPES.join(", ")
        )));
    }

    let report = service
        .save_report(file_data, &file_name, &content_type, section_id, user_id)
        .await?;

    Ok(Json(ApiResponse::success(
        Some(ReportResponseDto::from(report)),
        Some("File upload success".to_string()),
        None,
    )))
}

/// List all reports of a section
#[utoipa::path(
    get,
    path = "/MeausrePro/report/reports/{sectionId}",
    params(
        ("sectionId" = i32, Path, description = "Section id")
    ),
    responses(
        (status = 200, description = "Reports of the section", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 404, description = "Section does not exist")
    ),
    tag = "reports"
)]
pub async fn reports_by_section(
    State(service): State<Arc<ReportService>>,
    Path(section_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = service.reports_by_section(section_id).await?;

    let total = reports.len() as i64;
    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(ReportResponseDto::from).collect();

    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Get a single report by id
///
/// Absence is reported as `data: null`, not as an error.
#[utoipa::path(
    get,
    path = "/MeausrePro/report/{reportId}",
    params(
        ("reportId" = i32, Path, description = "Report id")
    ),
    responses(
        (status = 200, description = "Report metadata, or null when absent", body = ApiResponse<ReportResponseDto>),
    ),
    tag = "reports"
)]
pub async fn report_by_id(
    State(service): State<Arc<ReportService>>,
    Path(report_id): Path<i32>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = service.report_by_id(report_id).await?;

    Ok(Json(ApiResponse::success(
        report.map(ReportResponseDto::from),
        None,
        None,
    )))
}

/// Delete a report by id
#[utoipa::path(
    delete,
    path = "/MeausrePro/report/delete/{idx}",
    params(
        ("idx" = i32, Path, description = "Report id")
    ),
    responses(
        (status = 200, description = "Report deleted", body = ApiResponse<DeleteReportResponseDto>),
        (status = 404, description = "Report does not exist")
    ),
    tag = "reports"
)]
pub async fn delete_report(
    State(service): State<Arc<ReportService>>,
    Path(idx): Path<i32>,
) -> Result<Json<ApiResponse<DeleteReportResponseDto>>> {
    let deleted = service.delete_by_report_idx(idx).await?;

    if !deleted {
        return Err(AppError::NotFound(format!("Report {} does not exist", idx)));
    }

    Ok(Json(ApiResponse::success(
        Some(DeleteReportResponseDto { deleted: true }),
        Some("Report deleted successfully".to_string()),
        None,
    )))
}
