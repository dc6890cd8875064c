// SQLite Metadata Pool Setup

use crate::error::map_sqlx_error;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tablepoll_core::error::{AppError, Result};

/// Busy timeout shared by the metadata pool and source connections
pub(crate) const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Create the checkpoint metadata pool (WAL mode, created if missing)
///
/// Accepts a `sqlite:` URL, a plain file path or `:memory:`.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| AppError::Config(format!("invalid metadata db url {}: {}", database_url, e)))?
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT)
        .create_if_missing(true);

    // In-memory databases exist per connection: keep a single one
    let max_connections = if database_url.contains(":memory:") { 1 } else { 4 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(map_sqlx_error)?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_pool() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        assert!(pool.acquire().await.is_ok());
    }

    #[tokio::test]
    async fn test_create_pool_rejects_unknown_parameter() {
        let err = create_pool("sqlite::memory:?flavour=mint").await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
