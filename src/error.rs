//! Error types for the observer agreement engine

use thiserror::Error;

/// Errors that can occur while preparing or running an agreement comparison
#[derive(Debug, Error)]
pub enum IoaError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid bin width: {0} ms (must be greater than zero)")]
    InvalidBinWidth(u64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid partition: {0}")]
    InvalidPartition(String),

    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
