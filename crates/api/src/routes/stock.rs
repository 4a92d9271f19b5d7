//! Stock ledger endpoints called by a remote shop.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use catalog::ReleaseOutcome;
use common::{OrderLine, ReservationToken, StockRequest};
use serde::{Deserialize, Serialize};

use crate::CatalogState;
use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeStock {
    pub token: ReservationToken,
    pub requests: Vec<StockRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseStock {
    pub token: ReservationToken,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseReply {
    pub outcome: String,
    pub lines: usize,
}

/// POST /api/stock/finalize
///
/// Answers with the order lines, or an error body when the batch is refused.
#[tracing::instrument(skip(state, body), fields(token = %body.token))]
pub async fn finalize(
    State(state): State<Arc<CatalogState>>,
    Json(body): Json<FinalizeStock>,
) -> Result<Json<Vec<OrderLine>>, ApiError> {
    let lines = state.ledger.finalize(body.token, &body.requests).await?;
    Ok(Json(lines))
}

/// POST /api/stock/release
#[tracing::instrument(skip(state, body), fields(token = %body.token))]
pub async fn release(
    State(state): State<Arc<CatalogState>>,
    Json(body): Json<ReleaseStock>,
) -> Json<ReleaseReply> {
    let reply = match state.ledger.release(body.token).await {
        ReleaseOutcome::Restocked { lines } => ReleaseReply {
            outcome: "Restocked".into(),
            lines,
        },
        ReleaseOutcome::AlreadyReleased => ReleaseReply {
            outcome: "AlreadyReleased".into(),
            lines: 0,
        },
        ReleaseOutcome::NothingReserved => ReleaseReply {
            outcome: "NothingReserved".into(),
            lines: 0,
        },
    };
    Json(reply)
}
