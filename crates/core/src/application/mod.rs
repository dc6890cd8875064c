// Application Layer - Extraction use cases

pub mod extraction_job;
pub mod materializer;
pub mod poll_executor;
pub mod query_builder;
pub mod runner;

// Re-exports
pub use extraction_job::{ExtractionJob, PollOutcome};
pub use materializer::RowMaterializer;
pub use poll_executor::PollExecutor;
pub use runner::{shutdown_channel, PollRunner, RunStats, ShutdownSender, ShutdownToken};
