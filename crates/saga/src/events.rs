//! Saga log events.

use chrono::{DateTime, Utc};
use common::{CartId, CartItemId, ErrorKind, Money, OrderId, OrderLine, SagaId, StockRequest, UserId};
use domain::DomainEvent;
use serde::{Deserialize, Serialize};

/// How a faulted attempt was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// The order had been stored; the cart was cleared.
    OrderRecovered,
    /// No order existed; the stock reservation was returned.
    ReservationReleased,
}

/// Records of one placement attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SagaEvent {
    SagaStarted(SagaStartedData),
    CartLoaded(CartLoadedData),
    StockFinalized(StockFinalizedData),
    OrderPersisted(OrderPersistedData),
    SagaRejected(SagaRejectedData),
    SagaFaulted(SagaFaultedData),
    SagaReconciled(SagaReconciledData),
}

impl DomainEvent for SagaEvent {
    fn kind(&self) -> &'static str {
        match self {
            SagaEvent::SagaStarted(_) => "SagaStarted",
            SagaEvent::CartLoaded(_) => "CartLoaded",
            SagaEvent::StockFinalized(_) => "StockFinalized",
            SagaEvent::OrderPersisted(_) => "OrderPersisted",
            SagaEvent::SagaRejected(_) => "SagaRejected",
            SagaEvent::SagaFaulted(_) => "SagaFaulted",
            SagaEvent::SagaReconciled(_) => "SagaReconciled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SagaStartedData {
    pub saga_id: SagaId,
    pub user_id: UserId,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLoadedData {
    pub cart_id: CartId,
    /// The cart entries this attempt orders; only these leave the cart.
    pub item_ids: Vec<CartItemId>,
    pub requests: Vec<StockRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockFinalizedData {
    pub lines: Vec<OrderLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPersistedData {
    pub order_id: OrderId,
    pub sum: Money,
    pub products_amount: u32,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SagaRejectedData {
    pub kind: ErrorKind,
    pub reason: String,
    pub rejected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SagaFaultedData {
    pub step: String,
    pub reason: String,
    pub faulted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SagaReconciledData {
    pub resolution: Resolution,
    pub reconciled_at: DateTime<Utc>,
}

impl SagaEvent {
    pub fn started(saga_id: SagaId, user_id: UserId) -> Self {
        SagaEvent::SagaStarted(SagaStartedData {
            saga_id,
            user_id,
            started_at: Utc::now(),
        })
    }

    pub fn cart_loaded(
        cart_id: CartId,
        item_ids: Vec<CartItemId>,
        requests: Vec<StockRequest>,
    ) -> Self {
        SagaEvent::CartLoaded(CartLoadedData {
            cart_id,
            item_ids,
            requests,
        })
    }

    pub fn stock_finalized(lines: Vec<OrderLine>) -> Self {
        SagaEvent::StockFinalized(StockFinalizedData { lines })
    }

    pub fn order_persisted(order_id: OrderId, sum: Money, products_amount: u32) -> Self {
        SagaEvent::OrderPersisted(OrderPersistedData {
            order_id,
            sum,
            products_amount,
            completed_at: Utc::now(),
        })
    }

    pub fn rejected(kind: ErrorKind, reason: impl Into<String>) -> Self {
        SagaEvent::SagaRejected(SagaRejectedData {
            kind,
            reason: reason.into(),
            rejected_at: Utc::now(),
        })
    }

    pub fn faulted(step: impl Into<String>, reason: impl Into<String>) -> Self {
        SagaEvent::SagaFaulted(SagaFaultedData {
            step: step.into(),
            reason: reason.into(),
            faulted_at: Utc::now(),
        })
    }

    pub fn reconciled(resolution: Resolution) -> Self {
        SagaEvent::SagaReconciled(SagaReconciledData {
            resolution,
            reconciled_at: Utc::now(),
        })
    }
}
