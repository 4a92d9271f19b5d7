//! User directory endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::UserId;
use domain::{NewUser, User};
use serde::Deserialize;

use super::{non_empty, read_id};
use crate::ShopState;
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub username_like: Option<String>,
    pub order_by: Option<String>,
}

/// POST /api/users
#[tracing::instrument(skip(state, new_user), fields(username = %new_user.username))]
pub async fn register(
    State(state): State<Arc<ShopState>>,
    Json(new_user): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.users.register(new_user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users?usernameLike=&orderBy=
pub async fn list(
    State(state): State<Arc<ShopState>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state
        .users
        .list(query.username_like.as_deref(), query.order_by.as_deref())
        .await;
    non_empty(users)
}

/// GET /api/users/{id}
pub async fn get(
    State(state): State<Arc<ShopState>>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let id: UserId = read_id(&id)?;
    state.users.get(id).await.map(Json).ok_or(ApiError::NoContent)
}
