// MySQL Source Connector

use crate::error::map_sqlx_error;
use crate::row::{column_names, decode_row};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::Connection;
use std::str::FromStr;
use tablepoll_core::domain::{ConnectionSettings, QueryText, RowBatch};
use tablepoll_core::error::{AppError, Result};
use tablepoll_core::port::{SourceConnection, SourceConnector};
use tracing::debug;

/// Connects to a MySQL source with the configured user and password
///
/// Credentials from the settings override any embedded in the URL.
pub struct MySqlSourceConnector {
    display_url: String,
    options: MySqlConnectOptions,
}

impl MySqlSourceConnector {
    pub fn new(settings: &ConnectionSettings) -> Result<Self> {
        let display_url = redact_url(settings.url());
        let options = MySqlConnectOptions::from_str(settings.url())
            .map_err(|e| AppError::Config(format!("invalid mysql url {}: {}", display_url, e)))?
            .username(settings.user())
            .password(settings.password());
        Ok(Self {
            display_url,
            options,
        })
    }
}

#[async_trait]
impl SourceConnector for MySqlSourceConnector {
    async fn connect(&self) -> Result<Box<dyn SourceConnection>> {
        let conn = MySqlConnection::connect_with(&self.options)
            .await
            .map_err(map_sqlx_error)?;
        debug!(url = %self.display_url, "Connected to mysql source");
        Ok(Box::new(MySqlSourceConnection { conn }))
    }

    fn describe(&self) -> String {
        self.display_url.clone()
    }
}

/// Single MySQL connection; sqlx keeps the prepared statement per query text
pub struct MySqlSourceConnection {
    conn: MySqlConnection,
}

#[async_trait]
impl SourceConnection for MySqlSourceConnection {
    async fn fetch(&mut self, query: &QueryText, max_rows: usize) -> Result<RowBatch> {
        let sql = bounded_sql(query);
        let mut rows = sqlx::query(&sql)
            .bind(query.offset())
            .bind(max_rows as u64)
            .fetch(&mut self.conn);

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

/// Parameterized statement with a server-side row bound
///
/// Rows cut off client-side would still be read off the wire before the next
/// command, so `max_rows` goes into the statement as `LIMIT ?`. The query
/// text ends at the offset placeholder, which keeps the clause valid.
pub(crate) fn bounded_sql(query: &QueryText) -> String {
    format!("{} LIMIT ?", query.parameterized())
}

/// Hide `user:password@` in a connection URL
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_url() {
        assert_eq!(
            redact_url("mysql://root:hunter2@db:3306/shop"),
            "mysql://***@db:3306/shop"
        );
        assert_eq!(redact_url("mysql://db:3306/shop"), "mysql://db:3306/shop");
    }

    #[test]
    fn test_statement_carries_row_limit() {
        let query = QueryText::new("SELECT * FROM orders WHERE id > ", 3);
        assert_eq!(
            bounded_sql(&query),
            "SELECT * FROM orders WHERE id > ? LIMIT ?"
        );
    }

    #[test]
    fn test_connector_describe_hides_password() {
        let settings = ConnectionSettings::new("mysql://app:pw@localhost/shop", "reader", "secret");
        let connector = MySqlSourceConnector::new(&settings).unwrap();
        assert_eq!(connector.describe(), "mysql://***@localhost/shop");
    }

    #[test]
    fn test_connector_rejects_invalid_url() {
        let settings = ConnectionSettings::new("mysql://[bad", "reader", "secret");
        assert!(matches!(
            MySqlSourceConnector::new(&settings),
            Err(AppError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_unreachable_server_is_database_error() {
        // Port 1 on localhost refuses connections
        let settings = ConnectionSettings::new("mysql://127.0.0.1:1/shop", "reader", "secret");
        let connector = MySqlSourceConnector::new(&settings).unwrap();
        assert!(matches!(
            connector.connect().await,
            Err(AppError::Database(_))
        ));
    }
}
