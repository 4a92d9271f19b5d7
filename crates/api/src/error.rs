//! API error types with HTTP response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog::LedgerError;
use common::{ErrorBody, ErrorKind};
use domain::{CartError, DomainError, UserError};
use saga::SagaError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Nothing to return on a read path.
    NoContent,
    /// The entity a mutation addresses does not exist.
    NotFound(String),
    /// A business rule refused the request.
    Rejected { kind: ErrorKind, message: String },
    /// A collaborating service could not answer.
    Unavailable(String),
    /// Storage failure or an attempt that awaits reconciliation.
    Internal { kind: ErrorKind, message: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Rejected {
            kind: ErrorKind::Validation,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal {
            kind: ErrorKind::Internal,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NoContent => return StatusCode::NO_CONTENT.into_response(),
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorBody::new(ErrorKind::NotFound, message),
            ),
            ApiError::Rejected { kind, message } => {
                let status = match kind {
                    ErrorKind::AlreadyInCart => StatusCode::CONFLICT,
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, ErrorBody::new(kind, message))
            }
            ApiError::Unavailable(message) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody::new(ErrorKind::Unavailable, message),
            ),
            ApiError::Internal { kind, message } => {
                tracing::error!(%kind, error = %message, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new(kind, message),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match err.kind() {
            ErrorKind::NotFound => ApiError::NotFound(err.to_string()),
            ErrorKind::Unavailable => ApiError::Unavailable(err.to_string()),
            kind => ApiError::Rejected {
                kind,
                message: err.to_string(),
            },
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        ApiError::Rejected {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Rejected {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::internal(err.to_string())
    }
}

impl From<SagaError> for ApiError {
    fn from(err: SagaError) -> Self {
        ApiError::internal(err.to_string())
    }
}
