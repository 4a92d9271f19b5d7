//! HTTP route handlers.

pub mod cart;
pub mod categories;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;
pub mod sagas;
pub mod stock;
pub mod users;

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::routing::{get, patch, post};
use common::UserId;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::{CatalogState, ShopState};

/// Header carrying the already-authenticated caller.
pub const USER_HEADER: &str = "x-user-id";

pub fn catalog_router(state: Arc<CatalogState>) -> Router {
    Router::new()
        .route("/api/products", get(products::list))
        .route("/api/products/{id}", get(products::get))
        .route("/api/categories", get(categories::roots))
        .route("/api/categories/{id}", get(categories::get))
        .route("/api/categories/{id}/products", get(products::in_category))
        .route("/api/stock/finalize", post(stock::finalize))
        .route("/api/stock/release", post(stock::release))
        .with_state(state)
}

pub fn shop_router(state: Arc<ShopState>) -> Router {
    Router::new()
        .route("/api/users", post(users::register).get(users::list))
        .route("/api/users/{id}", get(users::get))
        .route("/api/cart", get(cart::get).delete(cart::clear))
        .route("/api/cart/items", post(cart::add_item))
        .route(
            "/api/cart/items/{id}",
            patch(cart::change_amount).delete(cart::delete_item),
        )
        .route("/api/orders", post(orders::place).get(orders::list))
        .route("/api/orders/{id}", get(orders::get))
        .route("/api/sagas/reconcile", post(sagas::reconcile))
        .route("/api/sagas/{id}", get(sagas::get))
        .with_state(state)
}

/// `nameLike` / `orderBy` query parameters shared by listings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub name_like: Option<String>,
    pub order_by: Option<String>,
}

/// Id from a read path; a malformed id reads as absent.
pub(crate) fn read_id<T: From<Uuid>>(raw: &str) -> Result<T, ApiError> {
    Uuid::parse_str(raw.trim())
        .map(T::from)
        .map_err(|_| ApiError::NoContent)
}

/// Id from a mutation path; a malformed id is a validation error.
pub(crate) fn mutation_id<T: From<Uuid>>(raw: &str, what: &str) -> Result<T, ApiError> {
    Uuid::parse_str(raw.trim())
        .map(T::from)
        .map_err(|e| ApiError::validation(format!("invalid {what} '{raw}': {e}")))
}

/// Empty listings answer with no content.
pub(crate) fn non_empty<T>(items: Vec<T>) -> Result<Json<Vec<T>>, ApiError> {
    if items.is_empty() {
        Err(ApiError::NoContent)
    } else {
        Ok(Json(items))
    }
}

/// The caller named by the `x-user-id` header.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::validation(format!("missing {USER_HEADER} header")))?;
        mutation_id(raw, "user id").map(CurrentUser)
    }
}
