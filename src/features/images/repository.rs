use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::images::models::{Image, NewImage};

/// Persistence seam for image rows
#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn insert(&self, new: NewImage) -> Result<Image>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Image>>;

    /// All images of a section, in insertion order
    async fn find_by_section(&self, section_id: i32) -> Result<Vec<Image>>;

    /// Overwrite only the description column; returns `true` if the row exists
    async fn update_description(&self, id: i32, img_des: Option<String>) -> Result<bool>;

    /// Returns `true` if a row was deleted
    async fn delete_by_id(&self, id: i32) -> Result<bool>;
}

pub struct PgImageRepository {
    pool: PgPool,
}

impl PgImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImageRepository for PgImageRepository {
    async fn insert(&self, new: NewImage) -> Result<Image> {
        let image = sqlx::query_as::<_, Image>(
            "INSERT INTO images (img_src, section_id) \
             VALUES ($1, $2) \
             RETURNING id, img_src, img_des, section_id",
        )
        .bind(&new.img_src)
        .bind(new.section_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert image for section {}: {:?}", new.section_id, e);
            AppError::Database(e)
        })?;

        Ok(image)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Image>> {
        let image = sqlx::query_as::<_, Image>(
            "SELECT id, img_src, img_des, section_id FROM images WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(image)
    }

    async fn find_by_section(&self, section_id: i32) -> Result<Vec<Image>> {
        let images = sqlx::query_as::<_, Image>(
            "SELECT id, img_src, img_des, section_id FROM images \
             WHERE section_id = $1 ORDER BY id",
        )
        .bind(section_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(images)
    }

    async fn update_description(&self, id: i32, img_des: Option<String>) -> Result<bool> {
        let result = sqlx::query("UPDATE images SET img_des = $2 WHERE id = $1")
            .bind(id)
            .bind(img_des)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update description of image {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete image {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
