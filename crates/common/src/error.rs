//! Machine-readable error payload shared by every service boundary.

use serde::{Deserialize, Serialize};

/// Stable error classification carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The addressed entity does not exist.
    NotFound,
    /// Malformed identifiers or request bodies.
    Validation,
    /// A stock batch asked for a negative amount or more than is in stock.
    InvalidQuantity,
    /// A cart amount would exceed the product's stock.
    InsufficientStock,
    /// The product cannot be added because nothing is in stock.
    OutOfStock,
    /// The cart already holds an entry for the product.
    AlreadyInCart,
    /// An order attempt was refused; the cart is untouched.
    Rejected,
    /// An order attempt ended with an unknown outcome and awaits reconciliation.
    Faulted,
    /// A collaborating service could not be reached.
    Unavailable,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Validation => "Validation",
            ErrorKind::InvalidQuantity => "InvalidQuantity",
            ErrorKind::InsufficientStock => "InsufficientStock",
            ErrorKind::OutOfStock => "OutOfStock",
            ErrorKind::AlreadyInCart => "AlreadyInCart",
            ErrorKind::Rejected => "Rejected",
            ErrorKind::Faulted => "Faulted",
            ErrorKind::Unavailable => "Unavailable",
            ErrorKind::Internal => "Internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error payload: a stable kind plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorBody {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_as_its_name() {
        let body = ErrorBody::new(ErrorKind::InvalidQuantity, "amount below zero");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["kind"], "InvalidQuantity");
        assert_eq!(json["message"], "amount below zero");
        assert_eq!(ErrorKind::AlreadyInCart.to_string(), "AlreadyInCart");
    }
}
