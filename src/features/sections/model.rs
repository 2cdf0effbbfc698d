use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for survey sections
///
/// Section lifecycle is owned by an upstream collaborator; this backend only
/// validates foreign keys against it and cascades deletes from it.
#[derive(Debug, Clone, FromRow)]
pub struct Section {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
