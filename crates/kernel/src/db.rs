//! Database connection pool management.

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;

/// Create a PostgreSQL connection pool.
///
/// Connections are checked before being handed out so a restarted server
/// surfaces as a fresh connection rather than a failed request. Failure to
/// connect is a store error, retryable like any other.
pub async fn create_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .test_before_acquire(true)
        .connect(&config.database_url)
        .await
}

/// Check that the database answers a trivial query.
pub async fn check_health(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
