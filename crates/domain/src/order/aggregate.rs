use chrono::{DateTime, Utc};
use common::{AggregateId, Money, OrderId, OrderLine, UserId};
use journal::Sequence;
use ordering::{Field, FieldTable, SortValue};
use serde::Serialize;
use thiserror::Error;

use crate::aggregate::Aggregate;

use super::events::{OrderEvent, OrderPlacedData};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("order {0} has already been placed")]
    AlreadyPlaced(OrderId),

    #[error("an order needs at least one line")]
    NoLines,
}

/// A placed order: an immutable snapshot of the lines finalized at checkout.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: Option<OrderId>,
    user_id: Option<UserId>,
    date: Option<DateTime<Utc>>,
    sum: Money,
    products_amount: u32,
    products: Vec<OrderLine>,
    #[serde(skip)]
    sequence: Sequence,
}

impl Order {
    pub fn order_id(&self) -> Option<OrderId> {
        self.id
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date
    }

    pub fn sum(&self) -> Money {
        self.sum
    }

    pub fn products_amount(&self) -> u32 {
        self.products_amount
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.products
    }

    pub fn belongs_to(&self, user_id: UserId) -> bool {
        self.user_id == Some(user_id)
    }

    /// Decides the record for placing this order.
    ///
    /// Totals are derived from the lines here so they can never disagree.
    pub fn place(
        &self,
        order_id: OrderId,
        user_id: UserId,
        lines: Vec<OrderLine>,
        placed_at: DateTime<Utc>,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if let Some(existing) = self.id {
            return Err(OrderError::AlreadyPlaced(existing));
        }
        if lines.is_empty() {
            return Err(OrderError::NoLines);
        }

        let sum = lines.iter().map(|l| l.line_total).sum();
        let products_amount = lines.iter().map(|l| l.amount).sum();
        Ok(vec![OrderEvent::OrderPlaced(OrderPlacedData {
            order_id,
            user_id,
            placed_at,
            lines,
            sum,
            products_amount,
        })])
    }
}

impl Aggregate for Order {
    type Event = OrderEvent;
    type Error = OrderError;

    fn stream_type() -> &'static str {
        "Order"
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
            OrderEvent::OrderPlaced(data) => {
                self.id = Some(data.order_id);
                self.user_id = Some(data.user_id);
                self.date = Some(data.placed_at);
                self.sum = data.sum;
                self.products_amount = data.products_amount;
                self.products = data.lines;
            }
        }
    }
}

/// Sortable order fields. Newest orders come first by default.
pub static ORDER_FIELDS: FieldTable<Order> = FieldTable::new(
    "Order",
    &[
        Field::new("id", |o: &Order| {
            o.id.map_or(SortValue::Missing, |id| SortValue::from(id.as_uuid()))
        }),
        Field::new("date", |o: &Order| {
            o.date.map_or(SortValue::Missing, SortValue::from)
        }),
        Field::new("sum", |o: &Order| SortValue::from(o.sum.cents())),
        Field::new("productsamount", |o: &Order| {
            SortValue::from(o.products_amount)
        }),
    ],
    |a: &Order, b: &Order| b.date.cmp(&a.date),
);

#[cfg(test)]
mod tests {
    use common::ProductId;

    use super::*;

    fn line(cents: i64, amount: u32) -> OrderLine {
        OrderLine::new(ProductId::new(), Money::from_cents(cents), amount)
    }

    #[test]
    fn placing_derives_totals_from_lines() {
        let order = Order::default();
        let events = order
            .place(
                OrderId::new(),
                UserId::new(),
                vec![line(1000, 2), line(250, 1)],
                Utc::now(),
            )
            .unwrap();

        let mut placed = Order::default();
        placed.apply_all(events);
        assert_eq!(placed.sum(), Money::from_cents(2250));
        assert_eq!(placed.products_amount(), 3);
        assert_eq!(placed.lines().len(), 2);
    }

    #[test]
    fn cannot_place_twice_or_empty() {
        let id = OrderId::new();
        let mut order = Order::default();
        assert_eq!(
            order.place(id, UserId::new(), vec![], Utc::now()),
            Err(OrderError::NoLines)
        );

        let events = order
            .place(id, UserId::new(), vec![line(100, 1)], Utc::now())
            .unwrap();
        order.apply_all(events);
        assert_eq!(
            order.place(id, UserId::new(), vec![line(100, 1)], Utc::now()),
            Err(OrderError::AlreadyPlaced(id))
        );
    }

    #[test]
    fn order_table_is_valid() {
        assert!(ORDER_FIELDS.validate().is_ok());
    }

    #[test]
    fn serializes_like_the_order_payload() {
        let mut order = Order::default();
        let events = order
            .place(OrderId::new(), UserId::new(), vec![line(1000, 2)], Utc::now())
            .unwrap();
        order.apply_all(events);

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["sum"], 2000);
        assert_eq!(json["productsAmount"], 2);
        assert_eq!(json["products"][0]["lineTotal"], 2000);
        assert!(json.get("sequence").is_none());
    }
}
