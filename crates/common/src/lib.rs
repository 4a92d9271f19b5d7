//! Types shared by the catalog, shop and saga crates.

pub mod error;
pub mod money;
pub mod stock;
pub mod types;

pub use error::{ErrorBody, ErrorKind};
pub use money::Money;
pub use stock::{OrderLine, StockRequest};
pub use types::{
    AggregateId, CartId, CartItemId, CategoryId, OrderId, ProductId, ReservationToken, SagaId,
    UserId,
};
