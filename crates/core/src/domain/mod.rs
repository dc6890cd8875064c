// Domain Layer - Pure extraction logic and value types

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod offset;
pub mod query;
pub mod row;

// Re-exports
pub use checkpoint::{Checkpoint, TableName};
pub use config::{ConnectionSettings, JobConfig, ResultCharset};
pub use error::DomainError;
pub use lifecycle::JobState;
pub use offset::OffsetStrategy;
pub use query::QueryText;
pub use row::{CellValue, RowBatch};
