use crate::core::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(&config.url)
        .await
}

#[cfg(test)]
mod tests {
    const INITIAL_SCHEMA: &str = include_str!("../../migrations/0001_initial_schema.sql");

    // Owned rows must go through the service cascades so blob cleanup runs;
    // a DB-level cascade would silently strand every owned object.
    #[test]
    fn schema_restricts_db_level_fk_deletes() {
        assert_eq!(INITIAL_SCHEMA.matches("ON DELETE RESTRICT").count(), 3);
        assert!(!INITIAL_SCHEMA.contains("ON DELETE CASCADE"));
    }
}
