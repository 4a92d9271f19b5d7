//! Domain error types.

use journal::JournalError;
use thiserror::Error;

use crate::order::OrderError;

/// Errors raised while loading or saving aggregates.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("order error: {0}")]
    Order(#[from] OrderError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
