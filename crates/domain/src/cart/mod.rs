//! Per-user carts validated against current stock.

mod error;
mod lookup;
mod model;
mod service;

pub use error::CartError;
pub use lookup::{LookupError, ProductInfo, ProductLookup};
pub use model::{Cart, CartItem};
pub use service::CartService;
