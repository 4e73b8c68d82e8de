//! Error types for menagerie.

use thiserror::Error;
use uuid::Uuid;

use crate::models::JobStatus;

/// Result type alias using menagerie's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by a generation provider.
///
/// The message is recorded verbatim into a failed job's `error` field, so it
/// renders without any prefix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
}

impl ProviderError {
    /// Create a provider error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Core error type for menagerie operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Job not found
    #[error("Job not found: {0}")]
    JobNotFound(Uuid),

    /// A job with this id already exists
    #[error("Duplicate job id: {0}")]
    DuplicateJob(Uuid),

    /// Update would move a job backwards or out of a terminal state
    #[error("Invalid job transition: {from} -> {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    /// Generation provider failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error means the requested job does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::JobNotFound(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
