//! Saga instance aggregate.

use std::time::Duration;

use chrono::{DateTime, Utc};
use common::{AggregateId, CartId, CartItemId, ErrorKind, OrderId, OrderLine, SagaId, StockRequest, UserId};
use domain::Aggregate;
use journal::Sequence;
use serde::Serialize;

use crate::error::SagaError;
use crate::events::{Resolution, SagaEvent};
use crate::state::SagaState;
use crate::steps::SAGA_STREAM;

/// One order placement attempt, rebuilt from its log.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SagaInstance {
    id: Option<SagaId>,
    user_id: Option<UserId>,
    started_at: Option<DateTime<Utc>>,
    state: SagaState,
    cart_id: Option<CartId>,
    item_ids: Vec<CartItemId>,
    requests: Vec<StockRequest>,
    lines: Vec<OrderLine>,
    order_id: Option<OrderId>,
    rejection_kind: Option<ErrorKind>,
    failed_step: Option<String>,
    reason: Option<String>,
    resolution: Option<Resolution>,
    #[serde(skip)]
    sequence: Sequence,
}

impl Aggregate for SagaInstance {
    type Event = SagaEvent;
    type Error = SagaError;

    fn stream_type() -> &'static str {
        SAGA_STREAM
    }

    fn id(&self) -> Option<AggregateId> {
        self.id.map(AggregateId::from)
    }

    fn sequence(&self) -> Sequence {
        self.sequence
    }

    fn set_sequence(&mut self, sequence: Sequence) {
        self.sequence = sequence;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            SagaEvent::SagaStarted(data) => {
                self.id = Some(data.saga_id);
                self.user_id = Some(data.user_id);
                self.started_at = Some(data.started_at);
                self.state = SagaState::Idle;
            }
            SagaEvent::CartLoaded(data) => {
                self.cart_id = Some(data.cart_id);
                self.item_ids = data.item_ids;
                self.requests = data.requests;
                self.state = SagaState::CartLoaded;
            }
            SagaEvent::StockFinalized(data) => {
                self.lines = data.lines;
                self.state = SagaState::StockFinalized;
            }
            SagaEvent::OrderPersisted(data) => {
                self.order_id = Some(data.order_id);
                self.state = SagaState::OrderPersisted;
            }
            SagaEvent::SagaRejected(data) => {
                self.rejection_kind = Some(data.kind);
                self.reason = Some(data.reason);
                self.state = SagaState::Rejected;
            }
            SagaEvent::SagaFaulted(data) => {
                self.failed_step = Some(data.step);
                self.reason = Some(data.reason);
                self.state = SagaState::Faulted;
            }
            SagaEvent::SagaReconciled(data) => {
                self.resolution = Some(data.resolution);
            }
        }
    }
}

impl SagaInstance {
    pub fn saga_id(&self) -> Option<SagaId> {
        self.id
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn state(&self) -> SagaState {
        self.state
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn cart_id(&self) -> Option<CartId> {
        self.cart_id
    }

    /// Cart entries the attempt ordered.
    pub fn item_ids(&self) -> &[CartItemId] {
        &self.item_ids
    }

    pub fn requests(&self) -> &[StockRequest] {
        &self.requests
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn order_id(&self) -> Option<OrderId> {
        self.order_id
    }

    pub fn rejection_kind(&self) -> Option<ErrorKind> {
        self.rejection_kind
    }

    pub fn failed_step(&self) -> Option<&str> {
        self.failed_step.as_deref()
    }

    /// Rejection or fault reason.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    /// Faulted and not yet settled by the reconciler.
    pub fn needs_reconciliation(&self) -> bool {
        self.state == SagaState::Faulted && self.resolution.is_none()
    }

    /// Started at least `grace` before `now` and still short of a final
    /// state, so whatever drove it is gone.
    pub fn is_abandoned(&self, now: DateTime<Utc>, grace: Duration) -> bool {
        !self.state.is_terminal()
            && self
                .started_at
                .is_some_and(|started| (now - started).to_std().is_ok_and(|age| age >= grace))
    }
}
