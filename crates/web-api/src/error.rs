use application::ApplicationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{ErrorKind, ValidationFailure};
use serde::Serialize;

/// Wire shape for every failed request: a kind plus the field-tagged
/// failure messages, rendered verbatim for inline display.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub failures: Vec<ValidationFailure>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, failures: Vec<ValidationFailure>) -> Self {
        Self {
            status,
            body: ErrorBody { kind, failures },
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        match error {
            ApplicationError::Validation(errors) => {
                let (status, kind) = match errors.kind {
                    ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NotFound"),
                    ErrorKind::Forbidden => (StatusCode::FORBIDDEN, "Forbidden"),
                    ErrorKind::BadRequest => (StatusCode::BAD_REQUEST, "BadRequest"),
                };
                ApiError::new(status, kind, errors.failures)
            }
            ApplicationError::Cancelled => {
                ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Cancelled", Vec::new())
            }
            ApplicationError::Repository(err) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal",
                vec![ValidationFailure::new("", err.to_string())],
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
