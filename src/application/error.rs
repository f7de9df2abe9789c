//! Error type shared by all application services.

use thiserror::Error;

use super::validation::ValidationError;
use crate::domain::DomainError;
use crate::infrastructure::RepositoryError;

/// Failure of an application service call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The submitted form was invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An authorization rule or invariant refused the operation.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Storage failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// A background task (password hashing) failed to complete.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
