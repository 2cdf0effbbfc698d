/// Object-store key prefix for report files
pub const REPORTS_PREFIX: &str = "reports";

/// Object-store key prefix for image files
pub const IMAGES_PREFIX: &str = "images";

/// Allowed MIME types for uploads (images + PDF reports)
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
];

/// Maximum upload size in bytes (10MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Check if a MIME type is allowed for upload
pub fn is_mime_type_allowed(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&content_type)
}
