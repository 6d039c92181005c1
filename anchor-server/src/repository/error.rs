//! Repository error types

use thiserror::Error;

/// Result type alias for repository operations
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Errors raised by any repository implementation
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database query failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored document could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other backend failure
    #[error("storage backend error: {0}")]
    Backend(String),
}
