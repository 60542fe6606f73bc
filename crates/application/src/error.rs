use domain::{RepositoryError, ValidationErrors};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error("operation cancelled")]
    Cancelled,
    #[error("repository error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Cancelled => Self::Cancelled,
            other => Self::Repository(other),
        }
    }
}
