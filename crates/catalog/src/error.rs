//! Stock ledger error types.

use common::{ErrorKind, ProductId, ReservationToken};
use thiserror::Error;

/// Why a requested amount cannot be taken from stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityIssue {
    BelowZero,
    ExceedsStock,
}

impl std::fmt::Display for QuantityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuantityIssue::BelowZero => write!(f, "amount below zero"),
            QuantityIssue::ExceedsStock => write!(f, "exceeds stock"),
        }
    }
}

/// Errors raised by the stock ledger. A failed batch changes nothing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// A request in the batch asks for an impossible amount.
    #[error("{reason} for product {product_id}")]
    InvalidQuantity {
        product_id: ProductId,
        reason: QuantityIssue,
    },

    /// The reservation under this token was released and cannot be reused.
    #[error("reservation {0} was released")]
    TokenReleased(ReservationToken),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidQuantity { .. } => ErrorKind::InvalidQuantity,
            LedgerError::TokenReleased(_) => ErrorKind::Rejected,
        }
    }
}

/// Convenience type alias for ledger results.
pub type Result<T> = std::result::Result<T, LedgerError>;
