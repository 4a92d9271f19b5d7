use std::collections::HashMap;
use std::sync::Arc;

use common::{OrderLine, ProductId, ReservationToken};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::model::{Category, Product};
use crate::tree::CategoryTree;

/// What the ledger remembers about a reservation token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reservation {
    Committed(Vec<OrderLine>),
    Released,
}

#[derive(Debug, Default)]
pub(crate) struct CatalogState {
    pub(crate) products: HashMap<ProductId, Product>,
    pub(crate) categories: CategoryTree,
    pub(crate) reservations: HashMap<ReservationToken, Reservation>,
}

/// Process-local catalog storage shared by the listing service and the
/// stock ledger. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, CatalogState> {
        self.state.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, CatalogState> {
        self.state.write().await
    }

    pub async fn insert_category(&self, category: Category) {
        self.state.write().await.categories.insert(category);
    }

    pub async fn insert_product(&self, product: Product) {
        self.state
            .write()
            .await
            .products
            .insert(product.id, product);
    }

    pub async fn remove_product(&self, id: ProductId) -> Option<Product> {
        self.state.write().await.products.remove(&id)
    }

    /// Overwrites a product's stock count (restocking). Returns false for an
    /// unknown product.
    pub async fn set_stock(&self, id: ProductId, stock_amount: u32) -> bool {
        match self.state.write().await.products.get_mut(&id) {
            Some(product) => {
                product.stock_amount = stock_amount;
                true
            }
            None => false,
        }
    }

    pub async fn product(&self, id: ProductId) -> Option<Product> {
        self.state.read().await.products.get(&id).cloned()
    }

    pub async fn stock_of(&self, id: ProductId) -> Option<u32> {
        self.state
            .read()
            .await
            .products
            .get(&id)
            .map(|p| p.stock_amount)
    }

    pub async fn product_count(&self) -> usize {
        self.state.read().await.products.len()
    }

    pub async fn category_count(&self) -> usize {
        self.state.read().await.categories.len()
    }
}
