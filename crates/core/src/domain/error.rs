// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid job state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid query template: {0}")]
    InvalidTemplate(String),

    #[error("Unknown offset column: {0}")]
    UnknownColumn(String),

    #[error("Offset overflow for table {table}: {offset} + {delta}")]
    OffsetOverflow {
        table: String,
        offset: i64,
        delta: u64,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
