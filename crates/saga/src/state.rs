//! Saga state machine.

use serde::{Deserialize, Serialize};

/// The state of one order placement attempt.
///
/// ```text
/// Idle ──► CartLoaded ──► StockFinalized ──► OrderPersisted
///   │           │               │
///   └───────────┴──► Rejected   └──► Faulted
///               └──────────────────► Faulted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SagaState {
    #[default]
    Idle,
    CartLoaded,
    StockFinalized,
    /// Order stored and ordered items removed from the cart (terminal success).
    OrderPersisted,
    /// Refused before any stock was taken; cart untouched (terminal).
    Rejected,
    /// Stopped with an unknown outcome; awaits reconciliation (terminal).
    Faulted,
}

impl SagaState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SagaState::OrderPersisted | SagaState::Rejected | SagaState::Faulted
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SagaState::Idle => "Idle",
            SagaState::CartLoaded => "CartLoaded",
            SagaState::StockFinalized => "StockFinalized",
            SagaState::OrderPersisted => "OrderPersisted",
            SagaState::Rejected => "Rejected",
            SagaState::Faulted => "Faulted",
        }
    }
}

impl std::fmt::Display for SagaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
