// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
///
/// `Config` is fatal (raised once at startup). `Database` is transient and
/// self-heals through reconnect on the next cycle.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for errors that retrying cannot fix: abort startup or stop the loop
    pub fn is_fatal(&self) -> bool {
        use crate::domain::DomainError;
        matches!(
            self,
            AppError::Config(_)
                | AppError::Domain(DomainError::InvalidTemplate(_))
                | AppError::Domain(DomainError::UnknownColumn(_))
        )
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in the infra crates
// by converting to AppError::Database(String)
