use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::images::models::Image;

/// Upload image request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadImageDto {
    /// The image file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Id of the section the image belongs to
    #[schema(example = 5)]
    pub section_id: i32,
}

/// Response DTO for image metadata
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponseDto {
    /// Unique identifier for the image
    pub id: i32,
    /// Publicly resolvable URL of the stored image
    pub img_src: String,
    /// Free-text description, unset until edited
    pub img_des: Option<String>,
    /// Id of the owning section
    pub section_id: i32,
}

impl From<Image> for ImageResponseDto {
    fn from(image: Image) -> Self {
        Self {
            id: image.id,
            img_src: image.img_src,
            img_des: image.img_des,
            section_id: image.section_id,
        }
    }
}

/// Request DTO for updating an image description
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateImageDescriptionDto {
    /// New description text; null clears the description
    #[validate(length(max = 2000, message = "imgDes must be at most 2000 characters"))]
    pub img_des: Option<String>,
}

/// Response DTO for image delete operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteImageResponseDto {
    /// Confirmation that the image was deleted
    pub deleted: bool,
}

/// Response DTO for the bare-filename URL convenience endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImageUrlResponseDto {
    /// Direct URL under the image prefix for the given filename
    pub url: String,
}
