//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub services: Vec<&'static str>,
}

/// GET /health: liveness plus the services this process hosts.
pub async fn check(State(services): State<Arc<Vec<&'static str>>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        services: services.as_ref().clone(),
    })
}
