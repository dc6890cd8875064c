// Poll Runner - fixed-interval host loop around one extraction job

mod shutdown;

pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use super::extraction_job::{ExtractionJob, PollOutcome};
use crate::error::{AppError, Result};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

/// Counters collected over a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub cycles: u64,
    pub rows_emitted: u64,
    pub empty_cycles: u64,
    pub skipped_cycles: u64,
    pub failed_cycles: u64,
}

impl RunStats {
    fn record(&mut self, outcome: &PollOutcome) {
        self.cycles += 1;
        match outcome {
            PollOutcome::Emitted { rows, .. } => self.rows_emitted += *rows as u64,
            PollOutcome::Empty { .. } => self.empty_cycles += 1,
            PollOutcome::Skipped { .. } => self.skipped_cycles += 1,
        }
    }
}

/// Drives an opened job: one cycle, then idle for the poll interval
pub struct PollRunner {
    job: ExtractionJob,
    interval: Duration,
}

impl PollRunner {
    /// Runner using the job's configured poll interval
    pub fn new(job: ExtractionJob) -> Self {
        let interval = job.config().poll_interval;
        Self { job, interval }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run cycles until shutdown, then close the job
    ///
    /// Cycle errors are logged and the loop keeps going. A job that is not
    /// open, or a fatal error that every retry would repeat, ends it early.
    pub async fn run(mut self, mut shutdown: ShutdownToken) -> Result<RunStats> {
        let table = self.job.config().table.clone();
        let mut stats = RunStats::default();
        info!(table = %table, interval_ms = self.interval.as_millis() as u64, "Poll runner started");

        loop {
            if shutdown.is_shutdown() {
                info!(table = %table, "Poll runner shutting down");
                break;
            }

            match self.job.poll_once().await {
                Ok(outcome) => stats.record(&outcome),
                Err(e @ AppError::InvalidState(_)) => {
                    error!(table = %table, error = %e, "Job not pollable");
                    break;
                }
                Err(e) if e.is_fatal() => {
                    stats.cycles += 1;
                    stats.failed_cycles += 1;
                    error!(table = %table, error = %e, "Poll cycle failed, stopping runner");
                    break;
                }
                Err(e) => {
                    stats.cycles += 1;
                    stats.failed_cycles += 1;
                    error!(table = %table, error = %e, "Poll cycle failed");
                }
            }

            tokio::select! {
                _ = sleep(self.interval) => {},
                _ = shutdown.wait() => {
                    info!(table = %table, "Poll runner interrupted during idle");
                    break;
                }
            }
        }

        self.job.close().await?;
        info!(
            table = %table,
            cycles = stats.cycles,
            rows = stats.rows_emitted,
            skipped = stats.skipped_cycles,
            failed = stats.failed_cycles,
            "Poll runner stopped"
        );
        Ok(stats)
    }
}
