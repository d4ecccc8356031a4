//! Page loaders and mutation flows, generic over the repository traits.

use thiserror::Error;

use crate::domain::types::TypeConstraintError;
use crate::forms::FormState;
use crate::repository::errors::RepositoryError;

pub mod entity;
pub mod order;
pub mod reference;
pub mod sample;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("record not found")]
    NotFound,

    /// Rejected before any backend call; carries what the sheet needs to
    /// re-render.
    #[error("form validation failed")]
    Validation(FormState),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error(transparent)]
    TypeConstraint(#[from] TypeConstraintError),

    #[error("backend error: {0}")]
    Backend(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            other => ServiceError::Backend(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
