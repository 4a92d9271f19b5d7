//! Order placement saga.
//!
//! Placing an order spans the cart, the stock ledger and the order store,
//! which may live in different processes. [`OrderSagaCoordinator`] drives
//! the steps and logs each one to the journal:
//!
//! 1. Load the user's cart
//! 2. Finalize stock for every item under the attempt's reservation token
//! 3. Persist the order
//! 4. Remove the ordered items from the cart
//!
//! Business failures end the attempt as rejected with nothing changed. An
//! attempt that may have taken stock without storing its order ends as
//! faulted, and the [`Reconciler`] later settles it, together with attempts
//! that never finished at all.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod instance;
pub mod reconciler;
pub mod state;
pub mod steps;
pub mod stock;

pub use config::SagaConfig;
pub use coordinator::{OrderSagaCoordinator, SagaOutcome};
pub use error::{Result, SagaError};
pub use events::{Resolution, SagaEvent};
pub use instance::SagaInstance;
pub use reconciler::{ReconcileReport, Reconciler};
pub use state::SagaState;
pub use stock::{LocalStockService, StockError, StockService};
