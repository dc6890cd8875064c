// SQLite CheckpointStore Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use sqlx::SqlitePool;
use tablepoll_core::domain::DomainError;
use tablepoll_core::error::Result;
use tablepoll_core::port::CheckpointStore;
use tracing::debug;

/// Checkpoints in the `poll_checkpoints` metadata table
///
/// Keyed by source table name. `advance` is a single upsert statement, so
/// concurrent writers to the same key resolve last-writer-wins.
#[derive(Clone)]
pub struct SqliteCheckpointStore {
    pool: SqlitePool,
}

impl SqliteCheckpointStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn now_millis() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[async_trait]
impl CheckpointStore for SqliteCheckpointStore {
    async fn load(&self, table: &str) -> Result<Option<i64>> {
        let offset: Option<i64> = sqlx::query_scalar(
            "SELECT current_offset FROM poll_checkpoints WHERE source_table = ?",
        )
        .bind(table)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(table = %table, offset = ?offset, "Loaded checkpoint");
        Ok(offset)
    }

    async fn advance(&self, table: &str, delta: u64) -> Result<i64> {
        let delta_i64 = i64::try_from(delta).map_err(|_| DomainError::OffsetOverflow {
            table: table.to_string(),
            offset: 0,
            delta,
        })?;

        // Insert-if-absent (base 0), else add delta to the stored offset
        let offset: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO poll_checkpoints (source_table, current_offset, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(source_table) DO UPDATE
            SET current_offset = poll_checkpoints.current_offset + excluded.current_offset,
                updated_at = excluded.updated_at
            RETURNING current_offset
            "#,
        )
        .bind(table)
        .bind(delta_i64)
        .bind(Self::now_millis())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(table = %table, delta, offset, "Advanced checkpoint");
        Ok(offset)
    }

    async fn seed(&self, table: &str, offset: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO poll_checkpoints (source_table, current_offset, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(source_table) DO NOTHING
            "#,
        )
        .bind(table)
        .bind(offset)
        .bind(Self::now_millis())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }
}
