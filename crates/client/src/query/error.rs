use eventdesk_core::event::ErrorBody;
use thiserror::Error;

use crate::error::ClientError;

/// Error stored in the query cache for a key.
///
/// Unlike [`ClientError`] this is `Clone`, so every caller sharing a request
/// receives the same error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("{message}")]
    Fetch {
        message: String,
        status: Option<u16>,
        info: Option<ErrorBody>,
    },
    #[error("Query was cancelled")]
    Cancelled,
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl QueryError {
    /// The `message` field of the backend's error body, if present.
    pub fn info_message(&self) -> Option<&str> {
        match self {
            QueryError::Fetch { info, .. } => info.as_ref().and_then(|b| b.message.as_deref()),
            _ => None,
        }
    }

    /// HTTP status code, if the failure was a non-success response.
    pub fn status(&self) -> Option<u16> {
        match self {
            QueryError::Fetch { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns true if the query was cancelled rather than failed.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, QueryError::Cancelled)
    }
}

impl From<ClientError> for QueryError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Aborted => QueryError::Cancelled,
            ClientError::Server {
                status,
                message,
                info,
            } => QueryError::Fetch {
                message,
                status: Some(status),
                info,
            },
            other => QueryError::Fetch {
                message: other.to_string(),
                status: other.status(),
                info: other.info_message().map(ErrorBody::new),
            },
        }
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::Serialization(err.to_string())
    }
}
