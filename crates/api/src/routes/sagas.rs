//! Saga inspection and reconciliation endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::SagaId;
use saga::{ReconcileReport, SagaInstance};

use super::read_id;
use crate::ShopState;
use crate::error::ApiError;

/// GET /api/sagas/{id}
pub async fn get(
    State(state): State<Arc<ShopState>>,
    Path(id): Path<String>,
) -> Result<Json<SagaInstance>, ApiError> {
    let saga_id: SagaId = read_id(&id)?;
    state
        .saga
        .get_saga(saga_id)
        .await?
        .map(Json)
        .ok_or(ApiError::NoContent)
}

/// POST /api/sagas/reconcile: settles every faulted attempt it can.
#[tracing::instrument(skip(state))]
pub async fn reconcile(
    State(state): State<Arc<ShopState>>,
) -> Result<Json<ReconcileReport>, ApiError> {
    let report = state.reconciler.reconcile_faulted().await?;
    Ok(Json(report))
}
