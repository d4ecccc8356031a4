use thiserror::Error;

use crate::client::ClientError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<ClientError> for RepositoryError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotFound(_) => RepositoryError::NotFound,

            ClientError::Validation(message) => RepositoryError::ValidationError(message),

            ClientError::Unauthorized => {
                RepositoryError::AccessDenied("backend rejected credentials".to_string())
            }
            ClientError::Forbidden(message) => RepositoryError::AccessDenied(message),

            ClientError::Http(e) => RepositoryError::ConnectionError(e.to_string()),
            ClientError::Unavailable { status, message } => {
                RepositoryError::ConnectionError(format!("status {status}: {message}"))
            }

            ClientError::Backend { status, message } => {
                RepositoryError::BackendError(format!("status {status}: {message}"))
            }

            ClientError::InvalidResponse(message) => RepositoryError::Unexpected(message),
            ClientError::Serialization(e) => {
                RepositoryError::Unexpected(format!("Malformed response: {e}"))
            }
        }
    }
}
