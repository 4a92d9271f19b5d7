use chrono::Utc;
use common::{OrderId, OrderLine, UserId};
use journal::{Journal, RecordQuery};

use crate::aggregate::Aggregate;
use crate::error::DomainError;
use crate::repository::Repository;

use super::{ORDER_FIELDS, Order, OrderEvent};

/// Places and reads orders stored as journal streams.
pub struct OrderService<J: Journal> {
    repository: Repository<J, Order>,
}

impl<J: Journal> OrderService<J> {
    pub fn new(journal: J) -> Self {
        Self {
            repository: Repository::new(journal),
        }
    }

    /// Persists a new order from finalized lines.
    ///
    /// The stream must not exist yet, so the same `order_id` can be placed
    /// at most once.
    #[tracing::instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn place(
        &self,
        order_id: OrderId,
        user_id: UserId,
        lines: Vec<OrderLine>,
    ) -> Result<Order, DomainError> {
        let committed = self
            .repository
            .execute(order_id.into(), |order| {
                order.place(order_id, user_id, lines, Utc::now())
            })
            .await?;
        tracing::info!(
            sum = %committed.aggregate.sum(),
            products_amount = committed.aggregate.products_amount(),
            "order placed"
        );
        Ok(committed.aggregate)
    }

    pub async fn get(&self, order_id: OrderId) -> Result<Option<Order>, DomainError> {
        self.repository.load_existing(order_id.into()).await
    }

    pub async fn exists(&self, order_id: OrderId) -> Result<bool, DomainError> {
        Ok(self.get(order_id).await?.is_some())
    }

    /// One order of one user; another user's order reads as absent.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Option<Order>, DomainError> {
        Ok(self.get(order_id).await?.filter(|o| o.belongs_to(user_id)))
    }

    /// All orders of a user in the requested order (newest first by default).
    #[tracing::instrument(skip(self))]
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        order_by: Option<&str>,
    ) -> Result<Vec<Order>, DomainError> {
        let records = self
            .repository
            .journal()
            .query(
                RecordQuery::new()
                    .stream_type(Order::stream_type())
                    .kind("OrderPlaced"),
            )
            .await?;

        let mut orders = Vec::new();
        for record in records {
            let mut order = Order::default();
            order.apply(record.decode::<OrderEvent>()?);
            order.set_sequence(record.sequence);
            if order.belongs_to(user_id) {
                orders.push(order);
            }
        }
        Ok(ordering::sort(orders, order_by, &ORDER_FIELDS))
    }
}
