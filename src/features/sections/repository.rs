use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::sections::model::Section;

/// Lookup-by-id access to sections, used for foreign-key validation
#[async_trait]
pub trait SectionRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Section>>;
}

pub struct PgSectionRepository {
    pool: PgPool,
}

impl PgSectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SectionRepository for PgSectionRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Section>> {
        let section = sqlx::query_as::<_, Section>(
            "SELECT id, name, created_at FROM sections WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up section {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        Ok(section)
    }
}
