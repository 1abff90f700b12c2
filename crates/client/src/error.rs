//! Client error types.

use eventdesk_core::event::ErrorBody;
use thiserror::Error;

/// Result type alias for client module.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Server {
        status: u16,
        message: String,
        /// Parsed JSON error body, when the backend sent one.
        info: Option<ErrorBody>,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request was aborted")]
    Aborted,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ClientError {
    /// HTTP status code of a non-success response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            ClientError::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The `message` field of the backend's error body, if present.
    pub fn info_message(&self) -> Option<&str> {
        match self {
            ClientError::Server { info, .. } => info.as_ref().and_then(|body| body.message.as_deref()),
            _ => None,
        }
    }
}
