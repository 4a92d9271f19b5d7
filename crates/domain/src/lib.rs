//! Shop domain: users, carts and orders.
//!
//! Orders are event-sourced aggregates stored in the [`journal`]; carts and
//! users are plain in-memory state guarded per cart and per directory.

pub mod aggregate;
pub mod cart;
pub mod error;
pub mod order;
pub mod repository;
pub mod user;

pub use aggregate::{Aggregate, DomainEvent};
pub use cart::{Cart, CartError, CartItem, CartService, LookupError, ProductInfo, ProductLookup};
pub use error::DomainError;
pub use order::{ORDER_FIELDS, Order, OrderError, OrderEvent, OrderPlacedData, OrderService};
pub use repository::{Committed, Repository};
pub use user::{NewUser, USER_FIELDS, User, UserDirectory, UserError};
