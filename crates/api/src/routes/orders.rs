//! Order placement and order history endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{ErrorKind, OrderId, SagaId};
use domain::Order;
use saga::SagaOutcome;
use serde::{Deserialize, Serialize};

use super::{CurrentUser, non_empty, read_id};
use crate::ShopState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub saga_id: SagaId,
    pub order: Order,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    pub order_by: Option<String>,
}

/// POST /api/orders: checks out the caller's cart.
///
/// A rejected attempt answers 400 with the rejection kind. A faulted attempt
/// answers 500 with kind `Faulted`; its stock is settled by reconciliation.
#[tracing::instrument(skip(state))]
pub async fn place(
    State(state): State<Arc<ShopState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<(StatusCode, Json<PlacedOrder>), ApiError> {
    match state.saga.place_order(user_id).await? {
        SagaOutcome::Completed { saga_id, order } => {
            Ok((StatusCode::CREATED, Json(PlacedOrder { saga_id, order })))
        }
        SagaOutcome::Rejected { kind, reason, .. } => Err(ApiError::Rejected {
            kind,
            message: reason,
        }),
        SagaOutcome::Faulted { saga_id, reason } => Err(ApiError::Internal {
            kind: ErrorKind::Faulted,
            message: format!("order attempt {saga_id} faulted: {reason}"),
        }),
    }
}

/// GET /api/orders?orderBy=
pub async fn list(
    State(state): State<Arc<ShopState>>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state
        .saga
        .orders()
        .list_for_user(user_id, query.order_by.as_deref())
        .await?;
    non_empty(orders)
}

/// GET /api/orders/{id}: another user's order reads as absent.
pub async fn get(
    State(state): State<Arc<ShopState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order_id: OrderId = read_id(&id)?;
    state
        .saga
        .orders()
        .get_for_user(user_id, order_id)
        .await?
        .map(Json)
        .ok_or(ApiError::NoContent)
}
