use std::sync::Arc;

use async_trait::async_trait;
use catalog::InMemoryCatalog;
use common::{Money, ProductId};
use thiserror::Error;

/// The product facts a cart needs to validate a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductInfo {
    pub id: ProductId,
    pub price: Money,
    pub stock_amount: u32,
}

/// The catalog could not answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("product lookup failed: {0}")]
pub struct LookupError(pub String);

/// Read access to current product stock, local or remote.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn product(&self, id: ProductId) -> Result<Option<ProductInfo>, LookupError>;
}

#[async_trait]
impl ProductLookup for InMemoryCatalog {
    async fn product(&self, id: ProductId) -> Result<Option<ProductInfo>, LookupError> {
        Ok(InMemoryCatalog::product(self, id).await.map(|p| ProductInfo {
            id: p.id,
            price: p.price,
            stock_amount: p.stock_amount,
        }))
    }
}

#[async_trait]
impl<T: ProductLookup + ?Sized> ProductLookup for Arc<T> {
    async fn product(&self, id: ProductId) -> Result<Option<ProductInfo>, LookupError> {
        (**self).product(id).await
    }
}
