//! Stock service boundary used by the saga.

use std::sync::Arc;

use async_trait::async_trait;
use catalog::{LedgerError, StockLedger};
use common::{ErrorKind, OrderLine, ReservationToken, StockRequest};
use thiserror::Error;

/// Failure of a stock call, classified by what it says about stock.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StockError {
    /// The ledger refused the batch; nothing was taken.
    #[error("{message}")]
    Rejected { kind: ErrorKind, message: String },

    /// The request never reached the ledger; nothing was taken.
    #[error("stock service unreachable: {0}")]
    Unreachable(String),

    /// The request may or may not have been applied.
    #[error("stock outcome unknown: {0}")]
    OutcomeUnknown(String),
}

impl From<LedgerError> for StockError {
    fn from(e: LedgerError) -> Self {
        StockError::Rejected {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

/// Finalizes and releases stock batches under a reservation token.
///
/// Implementations must be idempotent per token: finalizing a token twice
/// takes stock once, and a released token can no longer be finalized.
#[async_trait]
pub trait StockService: Send + Sync {
    async fn finalize(
        &self,
        token: ReservationToken,
        requests: &[StockRequest],
    ) -> Result<Vec<OrderLine>, StockError>;

    async fn release(&self, token: ReservationToken) -> Result<(), StockError>;
}

#[async_trait]
impl<T: StockService + ?Sized> StockService for Arc<T> {
    async fn finalize(
        &self,
        token: ReservationToken,
        requests: &[StockRequest],
    ) -> Result<Vec<OrderLine>, StockError> {
        (**self).finalize(token, requests).await
    }

    async fn release(&self, token: ReservationToken) -> Result<(), StockError> {
        (**self).release(token).await
    }
}

/// Stock service backed by an in-process ledger.
#[derive(Debug, Clone)]
pub struct LocalStockService {
    ledger: StockLedger,
}

impl LocalStockService {
    pub fn new(ledger: StockLedger) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl StockService for LocalStockService {
    async fn finalize(
        &self,
        token: ReservationToken,
        requests: &[StockRequest],
    ) -> Result<Vec<OrderLine>, StockError> {
        Ok(self.ledger.finalize(token, requests).await?)
    }

    async fn release(&self, token: ReservationToken) -> Result<(), StockError> {
        let outcome = self.ledger.release(token).await;
        tracing::debug!(?outcome, %token, "local release");
        Ok(())
    }
}
