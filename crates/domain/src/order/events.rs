use chrono::{DateTime, Utc};
use common::{Money, OrderId, OrderLine, UserId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

/// Events recorded on an order stream.
///
/// An order is immutable once placed, so its stream holds a single record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    OrderPlaced(OrderPlacedData),
}

impl DomainEvent for OrderEvent {
    fn kind(&self) -> &'static str {
        match self {
            OrderEvent::OrderPlaced(_) => "OrderPlaced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPlacedData {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub placed_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
    pub sum: Money,
    pub products_amount: u32,
}
