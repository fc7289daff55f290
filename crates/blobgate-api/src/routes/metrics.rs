//! Prometheus metrics endpoint

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use std::sync::Arc;

use crate::state::MetricsHandle;

/// Path the exporter is served on
pub const METRICS_ROUTE: &str = "/metrics";

/// Create the metrics route backed by the Prometheus handle
pub fn routes(handle: Arc<MetricsHandle>) -> Router {
    Router::new()
        .route(METRICS_ROUTE, get(render))
        .with_state(handle)
}

async fn render(State(handle): State<Arc<MetricsHandle>>) -> impl IntoResponse {
    handle.render()
}
