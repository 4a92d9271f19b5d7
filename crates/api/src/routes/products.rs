//! Product listing endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use catalog::Product;
use common::{CategoryId, ProductId};
use serde::Deserialize;

use super::{ListQuery, non_empty, read_id};
use crate::CatalogState;
use crate::error::ApiError;

/// GET /api/products?nameLike=&orderBy=
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<CatalogState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state
        .catalog
        .list_products(query.name_like.as_deref(), query.order_by.as_deref())
        .await;
    non_empty(products)
}

/// GET /api/products/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<CatalogState>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id: ProductId = read_id(&id)?;
    state
        .catalog
        .get_product(id)
        .await
        .map(Json)
        .ok_or(ApiError::NoContent)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProductsQuery {
    pub name_like: Option<String>,
    pub order_by: Option<String>,
    pub include_descendants: Option<bool>,
}

/// GET /api/categories/{id}/products?includeDescendants=&nameLike=&orderBy=
///
/// Descendant categories are included unless `includeDescendants=false`.
#[tracing::instrument(skip(state))]
pub async fn in_category(
    State(state): State<Arc<CatalogState>>,
    Path(id): Path<String>,
    Query(query): Query<CategoryProductsQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let category_id: CategoryId = read_id(&id)?;
    let products = state
        .catalog
        .products_in_category(
            category_id,
            query.include_descendants.unwrap_or(true),
            query.name_like.as_deref(),
            query.order_by.as_deref(),
        )
        .await;
    non_empty(products)
}
