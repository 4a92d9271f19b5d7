//! Saga error types.

use common::SagaId;
use domain::DomainError;
use journal::JournalError;
use thiserror::Error;

/// Fatal saga failures: storage problems, not business outcomes.
///
/// Rejections and faults are reported through
/// [`SagaOutcome`](crate::SagaOutcome) instead.
#[derive(Debug, Error)]
pub enum SagaError {
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("saga {0} not found")]
    NotFound(SagaId),
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
