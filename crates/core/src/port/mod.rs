// Port Layer - Interfaces for external dependencies

pub mod checkpoint_store;
pub mod record_sink;
pub mod source;

// Re-exports
pub use checkpoint_store::CheckpointStore;
pub use record_sink::RecordSink;
pub use source::{SourceConnection, SourceConnector};
