use common::{CategoryId, ProductId};

use crate::model::{CategoryNode, PRODUCT_FIELDS, Product};
use crate::store::InMemoryCatalog;

/// Read side of the catalog: product and category listings.
#[derive(Debug, Clone)]
pub struct CatalogService {
    catalog: InMemoryCatalog,
}

impl CatalogService {
    pub fn new(catalog: InMemoryCatalog) -> Self {
        Self { catalog }
    }

    /// All products whose name contains `name_like`, in the requested order.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(
        &self,
        name_like: Option<&str>,
        order_by: Option<&str>,
    ) -> Vec<Product> {
        let products: Vec<Product> = {
            let state = self.catalog.read().await;
            state
                .products
                .values()
                .filter(|p| p.name_matches(name_like))
                .cloned()
                .collect()
        };
        ordering::sort(products, order_by, &PRODUCT_FIELDS)
    }

    /// Products of one category, optionally including every descendant
    /// category. An unknown category yields an empty list.
    #[tracing::instrument(skip(self))]
    pub async fn products_in_category(
        &self,
        category_id: CategoryId,
        include_descendants: bool,
        name_like: Option<&str>,
        order_by: Option<&str>,
    ) -> Vec<Product> {
        let products: Vec<Product> = {
            let state = self.catalog.read().await;
            let scope = if include_descendants {
                state.categories.subtree_ids(category_id)
            } else if state.categories.get(category_id).is_some() {
                vec![category_id]
            } else {
                Vec::new()
            };
            if scope.is_empty() {
                return Vec::new();
            }
            state
                .products
                .values()
                .filter(|p| p.category_id.is_some_and(|c| scope.contains(&c)))
                .filter(|p| p.name_matches(name_like))
                .cloned()
                .collect()
        };
        ordering::sort(products, order_by, &PRODUCT_FIELDS)
    }

    pub async fn get_product(&self, id: ProductId) -> Option<Product> {
        self.catalog.product(id).await
    }

    pub async fn get_category(&self, id: CategoryId, with_nested: bool) -> Option<CategoryNode> {
        self.catalog.read().await.categories.resolve(id, with_nested)
    }

    pub async fn root_categories(&self, with_nested: bool) -> Vec<CategoryNode> {
        self.catalog.read().await.categories.list_roots(with_nested)
    }
}
