// Extraction Job - orchestrates query build, poll, emit and checkpoint advance

use super::materializer::RowMaterializer;
use super::poll_executor::PollExecutor;
use super::query_builder;
use crate::domain::{JobConfig, JobState, QueryText};
use crate::error::{AppError, Result};
use crate::port::{CheckpointStore, RecordSink, SourceConnector};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of one poll cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Rows were emitted and the checkpoint moved to `offset`
    Emitted { rows: usize, offset: i64 },
    /// Query succeeded but returned nothing; checkpoint untouched
    Empty { offset: i64 },
    /// Query failed; connection replaced, checkpoint untouched
    Skipped { offset: i64 },
}

impl PollOutcome {
    pub fn rows(&self) -> usize {
        match self {
            PollOutcome::Emitted { rows, .. } => *rows,
            _ => 0,
        }
    }

    pub fn offset(&self) -> i64 {
        match self {
            PollOutcome::Emitted { offset, .. }
            | PollOutcome::Empty { offset }
            | PollOutcome::Skipped { offset } => *offset,
        }
    }
}

/// One table-extraction job
///
/// Lifecycle hooks for the host: [`open`](Self::open),
/// [`poll_once`](Self::poll_once), [`close`](Self::close). Cycles take
/// `&mut self`, so two cycles of the same job can never overlap. Every piece
/// of connection state lives in this instance.
pub struct ExtractionJob {
    config: JobConfig,
    state: JobState,
    store: Arc<dyn CheckpointStore>,
    sink: Arc<dyn RecordSink>,
    executor: PollExecutor,
    materializer: RowMaterializer,
    current_offset: i64,
    query: Option<QueryText>,
}

impl ExtractionJob {
    pub fn new(
        config: JobConfig,
        connector: Arc<dyn SourceConnector>,
        store: Arc<dyn CheckpointStore>,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        let current_offset = config.start_from;
        Self {
            config,
            state: JobState::Uninitialized,
            store,
            sink,
            executor: PollExecutor::new(connector),
            materializer: RowMaterializer::default(),
            current_offset,
            query: None,
        }
    }

    /// Uninitialized -> Ready
    ///
    /// Validates configuration, resolves the starting offset (seeding the
    /// checkpoint on first run) and builds the first query.
    ///
    /// # Errors
    /// - AppError::Config for any missing or malformed setting (fatal)
    /// - AppError::Database if the checkpoint store is unreachable
    pub async fn open(&mut self) -> Result<()> {
        let next = self.state.transition(JobState::Ready)?;
        self.config.validate()?;
        self.materializer = RowMaterializer::new(self.config.result_charset()?);

        let table = self.config.table.as_str();
        let offset = self
            .store
            .effective_start(self.config.start_from, table)
            .await?;
        if self.store.seed(table, offset).await? {
            info!(table = %table, offset, "No checkpoint found, seeded from start offset");
        }

        let query = query_builder::build(&self.config, offset)?;
        info!(
            table = %table,
            offset,
            strategy = %self.config.offset_strategy,
            sql = %query,
            "Extraction job ready"
        );
        self.current_offset = offset;
        self.query = Some(query);
        self.state = next;
        Ok(())
    }

    /// Run one cycle: build, poll, emit, advance
    ///
    /// A failed query is not an error: it yields [`PollOutcome::Skipped`]
    /// and the next cycle retries the same offset.
    ///
    /// # Errors
    /// - AppError::InvalidState if the job was never opened or is closed
    /// - AppError::Sink if the host rejected the records (checkpoint untouched)
    /// - AppError::Database if the checkpoint store failed
    pub async fn poll_once(&mut self) -> Result<PollOutcome> {
        if matches!(self.state, JobState::Uninitialized | JobState::Closed) {
            return Err(AppError::InvalidState(format!(
                "job for table {} is {}, cannot poll",
                self.config.table, self.state
            )));
        }
        let next = self.state.transition(JobState::Polling)?;
        self.state = next;

        let table = self.config.table.clone();
        let offset = self
            .store
            .effective_start(self.config.start_from, &table)
            .await?;
        self.current_offset = offset;

        let query = query_builder::build(&self.config, offset)?;
        self.query = Some(query.clone());

        let batch = match self
            .executor
            .poll(&query, self.config.max_rows as usize)
            .await
        {
            Some(batch) => batch,
            None => return Ok(PollOutcome::Skipped { offset }),
        };
        if batch.is_empty() {
            debug!(table = %table, offset, "No new rows");
            return Ok(PollOutcome::Empty { offset });
        }

        let delta = self.config.offset_strategy.delta(&batch, offset)?;
        let records = self.materializer.materialize(&batch);
        let rows = records.len();

        if let Err(e) = self.sink.emit(&table, records).await {
            warn!(table = %table, offset, rows, error = %e, "Emit failed, checkpoint not advanced");
            return Err(e);
        }

        let new_offset = self.store.advance(&table, delta).await?;
        info!(table = %table, rows, delta, offset = new_offset, "Checkpoint advanced");
        self.current_offset = new_offset;
        Ok(PollOutcome::Emitted {
            rows,
            offset: new_offset,
        })
    }

    /// Release the connection. Terminal; closing twice is a no-op.
    pub async fn close(&mut self) -> Result<()> {
        if self.state.is_terminal() {
            return Ok(());
        }
        self.state = self.state.transition(JobState::Closed)?;
        self.executor.close().await?;
        info!(table = %self.config.table, offset = self.current_offset, "Extraction job closed");
        Ok(())
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Offset used by the most recent query (or reached by the last advance)
    pub fn current_offset(&self) -> i64 {
        self.current_offset
    }

    /// Query of the most recent cycle
    pub fn current_query(&self) -> Option<&QueryText> {
        self.query.as_ref()
    }

    pub fn reconnects(&self) -> u64 {
        self.executor.reconnects()
    }
}
