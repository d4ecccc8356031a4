//! Backend client error types

use thiserror::Error;

use crate::cache::TransientError;
use crate::pagination::PaginationError;

/// Failures talking to the backend REST API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend rejected the payload (400 or 422)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Gateway or availability failure (502, 503, 504)
    #[error("Backend unavailable ({status}): {message}")]
    Unavailable { status: u16, message: String },

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<PaginationError> for ClientError {
    fn from(err: PaginationError) -> Self {
        ClientError::InvalidResponse(err.to_string())
    }
}

impl TransientError for ClientError {
    fn is_transient(&self) -> bool {
        match self {
            ClientError::Http(err) => err.is_connect() || err.is_timeout(),
            ClientError::Unavailable { .. } => true,
            _ => false,
        }
    }
}

/// Result type for backend calls
pub type ClientResult<T> = Result<T, ClientError>;
