use serde::Serialize;
use thiserror::Error;

use crate::value_objects::ParticipantId;

/// Failures raised by aggregate operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("participant {id} does not exist in the room")]
    ParticipantNotFound { id: ParticipantId },

    #[error("the room is already closed")]
    RoomClosed,

    #[error("{field}: {reason}")]
    InvalidArgument { field: String, reason: String },
}

impl DomainError {
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Failures at the persistence boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("requested resource not found")]
    NotFound,

    #[error("rejected by concurrent modification")]
    Conflict,

    #[error("operation cancelled")]
    Cancelled,

    #[error("storage error: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Outcome classification rendered at the response boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    BadRequest,
}

/// One field-tagged, human-readable failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub field: String,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A classified set of validation failures, in the order they were raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?}: {}", format_failures(.failures))]
pub struct ValidationErrors {
    pub kind: ErrorKind,
    pub failures: Vec<ValidationFailure>,
}

impl ValidationErrors {
    pub fn new(kind: ErrorKind, failures: Vec<ValidationFailure>) -> Self {
        Self { kind, failures }
    }

    pub fn not_found(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, vec![ValidationFailure::new(field, message)])
    }

    pub fn forbidden(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, vec![ValidationFailure::new(field, message)])
    }

    pub fn bad_request(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, vec![ValidationFailure::new(field, message)])
    }
}

impl From<DomainError> for ValidationErrors {
    fn from(err: DomainError) -> Self {
        let field = match &err {
            DomainError::ParticipantNotFound { .. } => "participant_id".to_owned(),
            DomainError::RoomClosed => "room".to_owned(),
            DomainError::InvalidArgument { field, .. } => field.clone(),
        };
        Self::bad_request(field, err.to_string())
    }
}

fn format_failures(failures: &[ValidationFailure]) -> String {
    failures
        .iter()
        .map(|failure| {
            if failure.field.is_empty() {
                failure.message.clone()
            } else {
                format!("{}: {}", failure.field, failure.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}
