//! Orders: immutable snapshots of a successful checkout.

mod aggregate;
mod events;
mod service;

pub use aggregate::{ORDER_FIELDS, Order, OrderError};
pub use events::{OrderEvent, OrderPlacedData};
pub use service::OrderService;
