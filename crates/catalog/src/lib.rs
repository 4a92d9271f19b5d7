//! Catalog service core.
//!
//! Holds products and the category forest, answers listing queries through
//! the ordering engine and owns the [`StockLedger`], the only code path that
//! changes stock counts.

pub mod error;
pub mod ledger;
pub mod model;
pub mod seed;
pub mod service;
pub mod store;
pub mod tree;

pub use error::{LedgerError, QuantityIssue, Result};
pub use ledger::{ReleaseOutcome, StockLedger};
pub use model::{Category, CategoryNode, PRODUCT_FIELDS, Product};
pub use seed::seed_demo;
pub use service::CatalogService;
pub use store::InMemoryCatalog;
pub use tree::CategoryTree;
