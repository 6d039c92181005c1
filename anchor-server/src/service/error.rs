//! Baseline service error types

use thiserror::Error;
use uuid::Uuid;

use crate::repository::RepositoryError;

/// Result type alias for baseline operations
pub type Result<T> = std::result::Result<T, BaselineError>;

/// Errors surfaced by the baseline service
#[derive(Debug, Error)]
pub enum BaselineError {
    /// No execution with that id exists in the application
    #[error("No workflow execution found with id: {0}")]
    NotFound(Uuid),

    /// The execution exists but cannot serve as a baseline
    #[error("{0}")]
    Configuration(String),

    /// Stored baselines contradict the one-record-per-tuple rule
    #[error("Inconsistent baseline state: {0}")]
    Inconsistent(String),

    /// An underlying store operation failed
    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

impl BaselineError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        BaselineError::Configuration(message.into())
    }
}
