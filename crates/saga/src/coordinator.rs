//! Saga coordinator for order placement.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use common::{CartId, CartItemId, ErrorKind, SagaId, StockRequest, UserId};
use domain::{Aggregate, Cart, CartService, DomainEvent, Order, OrderService, ProductLookup};
use journal::{ExpectedSequence, Journal, JournalRecord, Sequence};
use tokio::sync::Mutex;

use crate::config::SagaConfig;
use crate::error::Result;
use crate::events::SagaEvent;
use crate::instance::SagaInstance;
use crate::steps::{
    EMPTY_CART, NOTHING_ORDERABLE, STEP_CLEAR_CART, STEP_FINALIZE_STOCK, STEP_LOAD_CART,
    STEP_PERSIST_ORDER,
};
use crate::stock::{StockError, StockService};

/// How a placement attempt ended.
#[derive(Debug, Clone)]
pub enum SagaOutcome {
    Completed { saga_id: SagaId, order: Order },
    Rejected {
        saga_id: SagaId,
        kind: ErrorKind,
        reason: String,
    },
    Faulted { saga_id: SagaId, reason: String },
}

impl SagaOutcome {
    pub fn saga_id(&self) -> SagaId {
        match self {
            SagaOutcome::Completed { saga_id, .. }
            | SagaOutcome::Rejected { saga_id, .. }
            | SagaOutcome::Faulted { saga_id, .. } => *saga_id,
        }
    }
}

/// The open log of the attempt being driven.
struct SagaLog {
    saga_id: SagaId,
    sequence: Sequence,
    step: &'static str,
}

/// Drives `PlaceOrder`: load cart, finalize stock, persist order, clear cart.
///
/// Every attempt is logged as its own journal stream. The attempt's id is
/// also its reservation token and its order id, so a retry of any step is
/// idempotent and a faulted attempt can be settled later by the
/// [`Reconciler`](crate::Reconciler).
pub struct OrderSagaCoordinator<J, P, S>
where
    J: Journal,
    P: ProductLookup,
    S: StockService,
{
    journal: J,
    orders: OrderService<J>,
    carts: CartService<P>,
    stock: S,
    config: SagaConfig,
    user_locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl<J, P, S> OrderSagaCoordinator<J, P, S>
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
            config,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Places an order from the user's cart.
    ///
    /// Attempts for the same user run one at a time. Business failures come
    /// back as [`SagaOutcome::Rejected`]. Once the stock call has been made,
    /// every failure comes back as [`SagaOutcome::Faulted`]; an `Err` means
    /// the attempt stopped before any stock could have been taken.
    #[tracing::instrument(skip(self))]
    pub async fn place_order(&self, user_id: UserId) -> Result<SagaOutcome> {
        let user_lock = self.user_lock(user_id).await;
        let outcome = {
            let _serialized = user_lock.lock().await;
            self.attempt(user_id).await
        };
        self.forget_user_lock(user_id, user_lock).await;
        outcome
    }

    async fn attempt(&self, user_id: UserId) -> Result<SagaOutcome> {
        let started = Instant::now();
        let saga_id = SagaId::new();
        let mut log = self.open_log(saga_id, user_id).await?;

        let outcome = self.run(&mut log, user_id).await;

        metrics::histogram!("saga_duration_seconds").record(started.elapsed().as_secs_f64());
        match &outcome {
            Ok(SagaOutcome::Completed { order, .. }) => {
                metrics::counter!("orders_placed_total").increment(1);
                tracing::info!(%saga_id, sum = %order.sum(), "checkout completed");
            }
            Ok(SagaOutcome::Rejected { reason, .. }) => {
                metrics::counter!("saga_rejected_total").increment(1);
                tracing::warn!(%saga_id, %reason, "order rejected");
            }
            Ok(SagaOutcome::Faulted { reason, .. }) => {
                metrics::counter!("saga_faulted_total").increment(1);
                tracing::error!(%saga_id, %reason, "order attempt faulted, awaiting reconciliation");
            }
            Err(e) => tracing::error!(%saga_id, error = %e, "saga aborted"),
        }
        outcome
    }

    async fn run(&self, log: &mut SagaLog, user_id: UserId) -> Result<SagaOutcome> {
        tracing::info!(step = log.step, "saga step started");
        let cart = self.carts.cart_for_user(user_id).await;
        if cart.is_empty() {
            return self.reject(log, ErrorKind::Rejected, EMPTY_CART).await;
        }
        let item_ids: Vec<CartItemId> = cart.items.iter().map(|item| item.id).collect();
        let requests = stock_requests(&cart);
        self.record(
            log,
            SagaEvent::cart_loaded(cart.id, item_ids.clone(), requests.clone()),
        )
        .await?;

        // Stock may be taken from here on; no error may leave unrecorded.
        match self
            .take_stock_and_order(log, user_id, cart.id, &item_ids, &requests)
            .await
        {
            Ok(outcome) => Ok(outcome),
            Err(e) => Ok(self.fault(log, e.to_string()).await),
        }
    }

    async fn take_stock_and_order(
        &self,
        log: &mut SagaLog,
        user_id: UserId,
        cart_id: CartId,
        item_ids: &[CartItemId],
        requests: &[StockRequest],
    ) -> Result<SagaOutcome> {
        let saga_id = log.saga_id;

        log.step = STEP_FINALIZE_STOCK;
        tracing::info!(step = log.step, "saga step started");
        let finalize = self.stock.finalize(saga_id.reservation_token(), requests);
        let lines = match tokio::time::timeout(self.config.stock_timeout, finalize).await {
            Ok(Ok(lines)) => lines,
            Ok(Err(StockError::Rejected { kind, message })) => {
                return self.reject(log, kind, message).await;
            }
            Ok(Err(e @ StockError::Unreachable(_))) => {
                return self.reject(log, ErrorKind::Unavailable, e.to_string()).await;
            }
            Ok(Err(e @ StockError::OutcomeUnknown(_))) => {
                return Ok(self.fault(log, e.to_string()).await);
            }
            Err(_) => {
                let reason = format!(
                    "stock call timed out after {}ms",
                    self.config.stock_timeout.as_millis()
                );
                return Ok(self.fault(log, reason).await);
            }
        };
        if lines.is_empty() {
            return self.reject(log, ErrorKind::Rejected, NOTHING_ORDERABLE).await;
        }
        self.record(log, SagaEvent::stock_finalized(lines.clone()))
            .await?;

        log.step = STEP_PERSIST_ORDER;
        tracing::info!(step = log.step, "saga step started");
        let order = match self.orders.place(saga_id.order_id(), user_id, lines).await {
            Ok(order) => order,
            Err(e) => return Ok(self.fault(log, e.to_string()).await),
        };

        log.step = STEP_CLEAR_CART;
        tracing::info!(step = log.step, "saga step started");
        self.carts.remove_items(cart_id, item_ids).await;

        let persisted =
            SagaEvent::order_persisted(saga_id.order_id(), order.sum(), order.products_amount());
        if let Err(e) = self.record(log, persisted).await {
            // The order stands; the open log is settled once it is abandoned.
            tracing::warn!(%saga_id, error = %e, "order stored but saga log left open");
        }
        Ok(SagaOutcome::Completed { saga_id, order })
    }

    /// Loads an attempt's log.
    pub async fn get_saga(&self, saga_id: SagaId) -> Result<Option<SagaInstance>> {
        load_saga(&self.journal, saga_id).await
    }

    pub fn orders(&self) -> &OrderService<J> {
        &self.orders
    }

    async fn user_lock(&self, user_id: UserId) -> Arc<Mutex<()>> {
        Arc::clone(self.user_locks.lock().await.entry(user_id).or_default())
    }

    /// Drops the user's lock entry unless another attempt holds or awaits it.
    async fn forget_user_lock(&self, user_id: UserId, lock: Arc<Mutex<()>>) {
        let mut locks = self.user_locks.lock().await;
        // One reference lives in the map, the other is `lock`.
        if Arc::strong_count(&lock) <= 2 {
            locks.remove(&user_id);
        }
    }

    async fn open_log(&self, saga_id: SagaId, user_id: UserId) -> Result<SagaLog> {
        let mut log = SagaLog {
            saga_id,
            sequence: Sequence::empty(),
            step: STEP_LOAD_CART,
        };
        self.record(&mut log, SagaEvent::started(saga_id, user_id))
            .await?;
        Ok(log)
    }

    async fn record(&self, log: &mut SagaLog, event: SagaEvent) -> Result<()> {
        log.sequence = append_saga_event(&self.journal, log.saga_id, log.sequence, &event).await?;
        Ok(())
    }

    async fn reject(
        &self,
        log: &mut SagaLog,
        kind: ErrorKind,
        reason: impl Into<String>,
    ) -> Result<SagaOutcome> {
        let reason = reason.into();
        self.record(log, SagaEvent::rejected(kind, reason.clone()))
            .await?;
        Ok(SagaOutcome::Rejected {
            saga_id: log.saga_id,
            kind,
            reason,
        })
    }

    /// Records a fault at the current step if the log still accepts writes.
    /// An unrecorded fault is picked up once the attempt counts as abandoned.
    async fn fault(&self, log: &mut SagaLog, reason: impl Into<String>) -> SagaOutcome {
        let reason = reason.into();
        let step = log.step;
        if let Err(e) = self.record(log, SagaEvent::faulted(step, reason.clone())).await {
            tracing::error!(saga_id = %log.saga_id, step, error = %e, "could not record fault");
        }
        SagaOutcome::Faulted {
            saga_id: log.saga_id,
            reason,
        }
    }
}

fn stock_requests(cart: &Cart) -> Vec<StockRequest> {
    cart.items
        .iter()
        .map(|item| {
            StockRequest::new(item.product_id, i32::try_from(item.amount).unwrap_or(i32::MAX))
        })
        .collect()
}

/// Rebuilds a saga from its stream, or `None` if it was never started.
pub(crate) async fn load_saga<J: Journal>(
    journal: &J,
    saga_id: SagaId,
) -> Result<Option<SagaInstance>> {
    let records = journal
        .read_stream(SagaInstance::stream_type(), saga_id.into())
        .await?;
    if records.is_empty() {
        return Ok(None);
    }
    let mut saga = SagaInstance::default();
    for record in records {
        saga.apply(record.decode::<SagaEvent>()?);
        saga.set_sequence(record.sequence);
    }
    Ok(Some(saga))
}

/// Appends one event to a saga stream that currently ends at `current`.
pub(crate) async fn append_saga_event<J: Journal>(
    journal: &J,
    saga_id: SagaId,
    current: Sequence,
    event: &SagaEvent,
) -> Result<Sequence> {
    let next = current.next();
    let record = JournalRecord::builder()
        .kind(event.kind())
        .stream(SagaInstance::stream_type(), saga_id.into())
        .sequence(next)
        .payload(event)?
        .build()?;
    Ok(journal
        .append(vec![record], ExpectedSequence::after(current))
        .await?)
}
