//! Settles faulted placement attempts.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::Utc;
use common::SagaId;
use domain::{Aggregate, CartService, OrderService, ProductLookup};
use journal::{Journal, JournalError, RecordQuery};
use serde::Serialize;

use crate::config::SagaConfig;
use crate::coordinator::{append_saga_event, load_saga};
use crate::error::{Result, SagaError};
use crate::events::{Resolution, SagaEvent};
use crate::instance::SagaInstance;
use crate::state::SagaState;
use crate::steps::{SAGA_STREAM, STEP_FINALIZE_STOCK, STEP_LOAD_CART, STEP_PERSIST_ORDER};
use crate::stock::StockService;

/// What one reconciliation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Attempts whose order existed; their ordered items left the cart.
    pub recovered: Vec<SagaId>,
    /// Attempts without an order; their stock was returned.
    pub released: Vec<SagaId>,
    /// Attempts that could not be settled this time.
    pub pending: Vec<SagaId>,
}

impl ReconcileReport {
    pub fn settled(&self) -> usize {
        self.recovered.len() + self.released.len()
    }
}

/// Finds faulted or abandoned attempts and brings stock, orders and carts
/// back in line.
///
/// An attempt faults when its stock outcome is unknown or its order could
/// not be confirmed. An attempt whose log stayed open longer than
/// [`SagaConfig::abandon_after`] is first marked faulted, which also stops
/// its coordinator from writing to the log again. If the order is on file
/// the attempt really succeeded, so only the ordered items leave the cart.
/// Otherwise the reservation is released, which also fences off a stock
/// call that is still in flight.
pub struct Reconciler<J, P, S>
where
    J: Journal,
    P: ProductLookup,
    S: StockService,
{
    journal: J,
    orders: OrderService<J>,
    carts: CartService<P>,
    stock: S,
    abandon_after: Duration,
}

impl<J, P, S> Reconciler<J, P, S>
where
    J: Journal + Clone,
    P: ProductLookup,
    S: StockService,
{
    pub fn new(journal: J, carts: CartService<P>, stock: S, config: SagaConfig) -> Self {
        let orders = OrderService::new(journal.clone());
        Self {
            journal,
            orders,
            carts,
            stock,
            abandon_after: config.abandon_after,
        }
    }

    /// Runs one pass over every unsettled attempt.
    #[tracing::instrument(skip(self))]
    pub async fn reconcile_faulted(&self) -> Result<ReconcileReport> {
        let now = Utc::now();
        let mut report = ReconcileReport::default();
        for saga_id in self.open_sagas().await? {
            let Some(mut saga) = load_saga(&self.journal, saga_id).await? else {
                continue;
            };
            if !saga.needs_reconciliation() {
                if !saga.is_abandoned(now, self.abandon_after) {
                    continue;
                }
                match self.mark_abandoned(saga_id, &mut saga).await {
                    Ok(()) => {}
                    Err(SagaError::Journal(JournalError::VersionConflict { .. })) => {
                        tracing::debug!(%saga_id, "attempt moved on, left alone");
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            let resolution = if self.orders.exists(saga_id.order_id()).await? {
                if let Some(cart_id) = saga.cart_id() {
                    self.carts.remove_items(cart_id, saga.item_ids()).await;
                }
                Resolution::OrderRecovered
            } else {
                match self.stock.release(saga_id.reservation_token()).await {
                    Ok(()) => Resolution::ReservationReleased,
                    Err(e) => {
                        tracing::warn!(%saga_id, error = %e, "release failed, will retry");
                        report.pending.push(saga_id);
                        continue;
                    }
                }
            };

            append_saga_event(
                &self.journal,
                saga_id,
                saga.sequence(),
                &SagaEvent::reconciled(resolution),
            )
            .await?;
            metrics::counter!("saga_reconciled_total").increment(1);
            tracing::info!(%saga_id, ?resolution, "saga reconciled");

            match resolution {
                Resolution::OrderRecovered => report.recovered.push(saga_id),
                Resolution::ReservationReleased => report.released.push(saga_id),
            }
        }
        Ok(report)
    }

    /// Attempts that were started and have neither ended cleanly nor been
    /// reconciled yet.
    async fn open_sagas(&self) -> Result<BTreeSet<SagaId>> {
        let records = self
            .journal
            .query(
                RecordQuery::new()
                    .stream_type(SAGA_STREAM)
                    .kind("SagaStarted")
                    .kind("OrderPersisted")
                    .kind("SagaRejected")
                    .kind("SagaReconciled"),
            )
            .await?;

        let mut started = BTreeSet::new();
        let mut closed = BTreeSet::new();
        for record in records {
            let saga_id = SagaId::from_uuid(record.stream_id.as_uuid());
            if record.kind == "SagaStarted" {
                started.insert(saga_id);
            } else {
                closed.insert(saga_id);
            }
        }
        Ok(started.difference(&closed).copied().collect())
    }

    async fn mark_abandoned(&self, saga_id: SagaId, saga: &mut SagaInstance) -> Result<()> {
        let step = interrupted_step(saga.state());
        tracing::warn!(%saga_id, step, state = %saga.state(), "attempt abandoned");
        let event = SagaEvent::faulted(step, "attempt abandoned before completion");
        let sequence = append_saga_event(&self.journal, saga_id, saga.sequence(), &event).await?;
        saga.apply(event);
        saga.set_sequence(sequence);
        Ok(())
    }
}

/// The step an attempt in `state` was working on.
fn interrupted_step(state: SagaState) -> &'static str {
    match state {
        SagaState::Idle => STEP_LOAD_CART,
        SagaState::CartLoaded => STEP_FINALIZE_STOCK,
        _ => STEP_PERSIST_ORDER,
    }
}
