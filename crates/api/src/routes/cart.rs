//! Cart endpoints. The cart is always the caller's own.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::{CartItemId, ProductId};
use domain::{Cart, CartItem};
use serde::Deserialize;

use super::{CurrentUser, mutation_id};
use crate::ShopState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItem {
    pub product_id: ProductId,
}

#[derive(Debug, Deserialize)]
pub struct ChangeAmount {
    pub delta: i32,
}

/// GET /api/cart
pub async fn get(
    State(state): State<Arc<ShopState>>,
    CurrentUser(user_id): CurrentUser,
) -> Json<Cart> {
    Json(state.carts.cart_for_user(user_id).await)
}

/// POST /api/cart/items
#[tracing::instrument(skip(state))]
pub async fn add_item(
    State(state): State<Arc<ShopState>>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<AddItem>,
) -> Result<(StatusCode, Json<CartItem>), ApiError> {
    let cart = state.carts.cart_for_user(user_id).await;
    let item = state.carts.add_item(cart.id, body.product_id).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PATCH /api/cart/items/{id}
///
/// Answers with the updated item, or no content when the item was removed.
#[tracing::instrument(skip(state))]
pub async fn change_amount(
    State(state): State<Arc<ShopState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<ChangeAmount>,
) -> Result<Response, ApiError> {
    let item_id: CartItemId = mutation_id(&id, "cart item id")?;
    let cart = state.carts.cart_for_user(user_id).await;
    match state
        .carts
        .change_amount(cart.id, item_id, body.delta)
        .await?
    {
        Some(item) => Ok(Json(item).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// DELETE /api/cart/items/{id}
#[tracing::instrument(skip(state))]
pub async fn delete_item(
    State(state): State<Arc<ShopState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let item_id: CartItemId = mutation_id(&id, "cart item id")?;
    let cart = state.carts.cart_for_user(user_id).await;
    state.carts.delete_item(cart.id, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/cart
pub async fn clear(
    State(state): State<Arc<ShopState>>,
    CurrentUser(user_id): CurrentUser,
) -> StatusCode {
    let cart = state.carts.cart_for_user(user_id).await;
    state.carts.clear(cart.id).await;
    StatusCode::NO_CONTENT
}
