// Poll Executor - runs one cycle's query and self-heals the connection

use crate::domain::{QueryText, RowBatch};
use crate::error::{AppError, Result};
use crate::port::{SourceConnection, SourceConnector};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Owns the job's single source connection
///
/// The connection is created lazily and replaced wholesale after any failed
/// cycle. There is no retry inside a cycle: one failure skips the cycle and
/// the next scheduled cycle runs on the new connection.
pub struct PollExecutor {
    connector: Arc<dyn SourceConnector>,
    connection: Option<Box<dyn SourceConnection>>,
    reconnects: u64,
}

impl PollExecutor {
    pub fn new(connector: Arc<dyn SourceConnector>) -> Self {
        Self {
            connector,
            connection: None,
            reconnects: 0,
        }
    }

    /// Execute `query` and materialize at most `max_rows` rows
    ///
    /// Returns None when the cycle failed. The error is logged and the
    /// connection has been replaced (or dropped, if reconnecting failed too).
    pub async fn poll(&mut self, query: &QueryText, max_rows: usize) -> Option<RowBatch> {
        let started = Instant::now();
        match self.try_poll(query, max_rows).await {
            Ok(batch) => {
                info!(
                    sql = %query,
                    rows = batch.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Poll executed"
                );
                Some(batch)
            }
            Err(e) => {
                error!(sql = %query, error = %e, "Poll failed, reconnecting");
                self.reconnect().await;
                None
            }
        }
    }

    async fn try_poll(&mut self, query: &QueryText, max_rows: usize) -> Result<RowBatch> {
        if self.connection.is_none() {
            debug!(target_db = %self.connector.describe(), "Opening source connection");
            self.connection = Some(self.connector.connect().await?);
        }
        let connection = self
            .connection
            .as_mut()
            .ok_or_else(|| AppError::Internal("source connection missing".to_string()))?;
        connection.fetch(query, max_rows).await
    }

    /// Discard the current connection and open a new one
    async fn reconnect(&mut self) {
        // The old connection may be broken: drop it without a graceful close
        self.connection = None;
        self.reconnects += 1;

        match self.connector.connect().await {
            Ok(connection) => {
                info!(
                    target_db = %self.connector.describe(),
                    reconnects = self.reconnects,
                    "Source connection re-established"
                );
                self.connection = Some(connection);
            }
            Err(e) => {
                warn!(
                    target_db = %self.connector.describe(),
                    error = %e,
                    "Reconnect failed, will connect on next cycle"
                );
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Number of connection replacements so far
    pub fn reconnects(&self) -> u64 {
        self.reconnects
    }

    /// Release the connection
    pub async fn close(&mut self) -> Result<()> {
        if let Some(connection) = self.connection.take() {
            connection.close().await?;
            debug!(target_db = %self.connector.describe(), "Source connection closed");
        }
        Ok(())
    }
}
