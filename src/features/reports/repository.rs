use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{NewReport, Report};

/// Persistence seam for report rows
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn insert(&self, new: NewReport) -> Result<Report>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Report>>;

    /// All reports of a section, in insertion order
    async fn find_by_section(&self, section_id: i32) -> Result<Vec<Report>>;

    /// All reports owned by a user, in insertion order
    async fn find_by_user(&self, user_id: i32) -> Result<Vec<Report>>;

    /// Returns `true` if a row was deleted
    async fn delete_by_id(&self, id: i32) -> Result<bool>;
}

pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn insert(&self, new: NewReport) -> Result<Report> {
        let report = sqlx::query_as::<_, Report>(
            "INSERT INTO reports (file_name, file_path, section_id, user_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, file_name, file_path, upload_date, section_id, user_id",
        )
        .bind(&new.file_name)
        .bind(&new.file_path)
        .bind(new.section_id)
        .bind(new.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert report '{}': {:?}", new.file_name, e);
            AppError::Database(e)
        })?;

        Ok(report)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Report>> {
        let report = sqlx::query_as::<_, Report>(
            "SELECT id, file_name, file_path, upload_date, section_id, user_id \
             FROM reports WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(report)
    }

    async fn find_by_section(&self, section_id: i32) -> Result<Vec<Report>> {
        let reports = sqlx::query_as::<_, Report>(
            "SELECT id, file_name, file_path, upload_date, section_id, user_id \
             FROM reports WHERE section_id = $1 ORDER BY id",
        )
        .bind(section_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(reports)
    }

    async fn find_by_user(&self, user_id: i32) -> Result<Vec<Report>> {
        let reports = sqlx::query_as::<_, Report>(
            "SELECT id, file_name, file_path, upload_date, section_id, user_id \
             FROM reports WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(reports)
    }

    async fn delete_by_id(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete report {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
