//! Liveness endpoint

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Health status response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Liveness handler; unrelated to cache or origin state
async fn health() -> Json<HealthResponse> {
    metrics::counter!("blobgate_health_checks_total").increment(1);

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create the health route at the configured path
pub fn routes(path: &str) -> Router<AppState> {
    Router::new().route(path, get(health))
}
