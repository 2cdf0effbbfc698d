use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for report files
///
/// `file_path` points at a blob actually present in the object store for the
/// lifetime of the row: the row is only written after a successful upload,
/// and row deletion triggers blob deletion.
#[derive(Debug, Clone, FromRow)]
pub struct Report {
    pub id: i32,
    pub file_name: String,
    pub file_path: String,
    pub upload_date: DateTime<Utc>,
    pub section_id: i32,
    pub user_id: i32,
}

/// Insert payload for a report row
#[derive(Debug, Clone)]
pub struct NewReport {
    pub file_name: String,
    pub file_path: String,
    pub section_id: i32,
    pub user_id: i32,
}
