//! Order placement saga constants.

/// Journal stream type of saga logs.
pub const SAGA_STREAM: &str = "OrderSaga";

pub const STEP_LOAD_CART: &str = "load_cart";
pub const STEP_FINALIZE_STOCK: &str = "finalize_stock";
pub const STEP_PERSIST_ORDER: &str = "persist_order";
pub const STEP_CLEAR_CART: &str = "clear_cart";

/// Rejection reason for a checkout with nothing in the cart.
pub const EMPTY_CART: &str = "empty cart";

/// Rejection reason when no cart entry produced an order line.
pub const NOTHING_ORDERABLE: &str = "no orderable items in cart";
