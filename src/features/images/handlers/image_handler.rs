use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::images::dtos::{
    DeleteImageResponseDto, ImageResponseDto, ImageUrlResponseDto, UpdateImageDescriptionDto,
    UploadImageDto,
};
use crate::features::images::services::ImageService;
use crate::shared::constants::{is_mime_type_allowed, ALLOWED_MIME_TYPES, MAX_FILE_SIZE};
use crate::shared::types::{ApiResponse, Meta};

/// Upload an image
///
/// Accepts multipart/form-data with:
/// - `file`: The image to upload (required)
/// - `sectionId`: Id of the owning section (required)
#[utoipa::path(
    post,
    path = "/MeausrePro/img/upload",
    tag = "images",
    request_body(
        content = UploadImageDto,
        content_type = "multipart/form-data",
        description = "Image upload form with owning section id",
    ),
    responses(
        (status = 200, description = "Image uploaded successfully", body = ApiResponse<ImageResponseDto>),
        (status = 400, description = "Invalid file or missing field"),
        (status = 404, description = "Section does not exist"),
        (status = 502, description = "Object store unavailable")
    )
)]
pub async fn upload_image(
    State(service): State<Arc<ImageService>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ImageResponseDto>>> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut section_id: Option<i32> = None;

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

    let image = service
        .upload_image(file_data, &file_name, &content_type, section_id)
        .await?;

    Ok(Json(ApiResponse::success(
        Some(ImageResponseDto::from(image)),
        Some("Image upload success".to_string()),
        None,
    )))
}

/// List all images of a section
#[utoipa::path(
    get,
    path = "/MeausrePro/img/section/{sectionId}",
    params(
        ("sectionId" = i32, Path, description = "Section id")
    ),
    responses(
        (status = 200, description = "Images of the section", body = ApiResponse<Vec<ImageResponseDto>>),
    ),
    tag = "images"
)]
pub async fn section_images(
    State(service): State<Arc<ImageService>>,
    Path(section_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<ImageResponseDto>>>> {
    let images = service.section_images(section_id).await?;

    let total = images.len() as i64;
    let dtos: Vec<ImageResponseDto> = images.into_iter().map(ImageResponseDto::from).collect();

    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Update the description of an image
///
/// Only the description changes; the image URL and section reference are
/// immutable after upload.
#[utoipa::path(
    put,
    path = "/MeausrePro/img/description/{idx}",
    params(
        ("idx" = i32, Path, description = "Image id")
    ),
    request_body = UpdateImageDescriptionDto,
    responses(
        (status = 200, description = "Description updated; the response carries no data payload"),
        (status = 400, description = "Invalid description"),
        (status = 404, description = "Image does not exist")
    ),
    tag = "images"
)]
pub async fn update_image_description(
    State(service): State<Arc<ImageService>>,
    Path(idx): Path<i32>,
    Json(dto): Json<UpdateImageDescriptionDto>,
) -> Result<Json<ApiResponse<()>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = service.update_img_des(idx, dto.img_des).await?;

    if !updated {
        return Err(AppError::NotFound(format!("Image {} does not exist", idx)));
    }

    Ok(Json(ApiResponse::success(
        None,
        Some("Image description updated".to_string()),
        None,
    )))
}

/// Delete an image by id
#[utoipa::path(
    delete,
    path = "/MeausrePro/img/delete/{idx}",
    params(
        ("idx" = i32, Path, description = "Image id")
    ),
    responses(
        (status = 200, description = "Image deleted", body = ApiResponse<DeleteImageResponseDto>),
        (status = 404, description = "Image does not exist")
    ),
    tag = "images"
)]
pub async fn delete_image(
    State(service): State<Arc<ImageService>>,
    Path(idx): Path<i32>,
) -> Result<Json<ApiResponse<DeleteImageResponseDto>>> {
    let deleted = service.delete_image(idx).await?;

    if !deleted {
        return Err(AppError::NotFound(format!("Image {} does not exist", idx)));
    }

    Ok(Json(ApiResponse::success(
        Some(DeleteImageResponseDto { deleted: true }),
        Some("Image deleted successfully".to_string()),
        None,
    )))
}

/// Build the direct URL for a bare image filename
///
/// A convenience for clients that already know the stored filename; neither
/// the store nor the database is consulted.
#[utoipa::path(
    get,
    path = "/MeausrePro/img/url/{fileName}",
    params(
        ("fileName" = String, Path, description = "Stored image filename")
    ),
    responses(
        (status = 200, description = "Direct URL for the filename", body = ApiResponse<ImageUrlResponseDto>),
    ),
    tag = "images"
)]
pub async fn image_url(
    State(service): State<Arc<ImageService>>,
    Path(file_name): Path<String>,
) -> Result<Json<ApiResponse<ImageUrlResponseDto>>> {
    let url = service.file_url(&file_name);

    Ok(Json(ApiResponse::success(
        Some(ImageUrlResponseDto { url }),
        None,
        None,
    )))
}
