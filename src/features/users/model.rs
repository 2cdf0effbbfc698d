use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for users
///
/// Account management lives upstream; reports reference users by id and the
/// user cascade removes their reports when the account goes away.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub created_at: DateTime<Utc>,
}
