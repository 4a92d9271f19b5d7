//! Category tree endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use catalog::CategoryNode;
use common::CategoryId;
use serde::Deserialize;

use super::{non_empty, read_id};
use crate::CatalogState;
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct NestedQuery {
    pub nested: Option<bool>,
}

/// GET /api/categories?nested=
pub async fn roots(
    State(state): State<Arc<CatalogState>>,
    Query(query): Query<NestedQuery>,
) -> Result<Json<Vec<CategoryNode>>, ApiError> {
    let roots = state
        .catalog
        .root_categories(query.nested.unwrap_or(false))
        .await;
    non_empty(roots)
}

/// GET /api/categories/{id}?nested=
pub async fn get(
    State(state): State<Arc<CatalogState>>,
    Path(id): Path<String>,
    Query(query): Query<NestedQuery>,
) -> Result<Json<CategoryNode>, ApiError> {
    let id: CategoryId = read_id(&id)?;
    state
        .catalog
        .get_category(id, query.nested.unwrap_or(false))
        .await
        .map(Json)
        .ok_or(ApiError::NoContent)
}
