//! API routes

mod health;
pub mod metrics;
mod objects;

use axum::Router;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::state::{AppState, MetricsHandle};

/// Create the main router
///
/// The health route and the optional metrics route are matched first; every
/// other path, whatever its method, is treated as an object request.
pub fn create_router(
    state: AppState,
    health_route: &str,
    metrics_handle: Option<Arc<MetricsHandle>>,
) -> Router {
    let mut router = Router::new()
        .merge(health::routes(health_route))
        .fallback(objects::get_object)
        .with_state(state);

    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
        .layer(CatchPanicLayer::new())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
