// Error handling module

use thiserror::Error;

/// Errors surfaced by the API client and service wrappers
#[derive(Error, Debug)]
pub enum ClientError {
    /// Backend returned a non-success status
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Request input was rejected before reaching the network
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unexpected failure (transport after retries, storage medium, ...)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
