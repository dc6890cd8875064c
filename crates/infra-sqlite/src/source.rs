// SQLite Source Connector

use crate::connection::BUSY_TIMEOUT;
use crate::error::map_sqlx_error;
use crate::row::{column_names, decode_row};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;
use std::str::FromStr;
use tablepoll_core::domain::{ConnectionSettings, QueryText, RowBatch};
use tablepoll_core::error::{AppError, Result};
use tablepoll_core::port::{SourceConnection, SourceConnector};
use tracing::debug;

/// Connects to a SQLite source database (read-only)
///
/// SQLite has no authentication: user and password are validated by the job
/// but not used here.
pub struct SqliteSourceConnector {
    url: String,
    options: SqliteConnectOptions,
}

impl SqliteSourceConnector {
    pub fn new(settings: &ConnectionSettings) -> Result<Self> {
        let url = settings.url().to_string();
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| AppError::Config(format!("invalid sqlite url {}: {}", url, e)))?
            .read_only(true)
            .busy_timeout(BUSY_TIMEOUT);
        Ok(Self { url, options })
    }
}

#[async_trait]
impl SourceConnector for SqliteSourceConnector {
    async fn connect(&self) -> Result<Box<dyn SourceConnection>> {
        let conn = SqliteConnection::connect_with(&self.options)
            .await
            .map_err(map_sqlx_error)?;
        debug!(url = %self.url, "Connected to sqlite source");
        Ok(Box::new(SqliteSourceConnection { conn }))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Single sqlite connection; sqlx caches the prepared statement per query text
pub struct SqliteSourceConnection {
    conn: SqliteConnection,
}

#[async_trait]
impl SourceConnection for SqliteSourceConnection {
    async fn fetch(&mut self, query: &QueryText, max_rows: usize) -> Result<RowBatch> {
        let sql = query.parameterized();
        let mut rows = sqlx::query(&sql).bind(query.offset()).fetch(&mut self.conn);

        let mut batch: Option<RowBatch> = None;
        while let Some(row) = rows.try_next().await.map_err(map_sqlx_error)? {
            let batch = batch.get_or_insert_with(|| RowBatch::new(column_names(&row)));
            batch.push_row(decode_row(&row)?);
            if batch.len() >= max_rows {
                break;
            }
        }
        Ok(batch.unwrap_or_default())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.conn.close().await.map_err(map_sqlx_error)
    }
}
