use common::{CartId, CartItemId, ErrorKind, ProductId};
use thiserror::Error;

use super::lookup::LookupError;

/// Business rejections of cart mutations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("cart {0} not found")]
    CartNotFound(CartId),

    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    #[error("cart item {0} not found")]
    ItemNotFound(CartItemId),

    /// The item's product no longer exists; the item has been removed.
    #[error("product {product_id} of cart item {item_id} no longer exists")]
    StaleItem {
        item_id: CartItemId,
        product_id: ProductId,
    },

    #[error("product {0} is out of stock")]
    OutOfStock(ProductId),

    #[error("product {0} is already in the cart")]
    AlreadyInCart(ProductId),

    #[error("requested amount {requested} exceeds stock of {available}")]
    InsufficientStock { requested: u32, available: u32 },

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl CartError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CartError::CartNotFound(_)
            | CartError::ProductNotFound(_)
            | CartError::ItemNotFound(_)
            | CartError::StaleItem { .. } => ErrorKind::NotFound,
            CartError::OutOfStock(_) => ErrorKind::OutOfStock,
            CartError::AlreadyInCart(_) => ErrorKind::AlreadyInCart,
            CartError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            CartError::Lookup(_) => ErrorKind::Unavailable,
        }
    }
}
