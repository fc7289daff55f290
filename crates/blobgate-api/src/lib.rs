//! Blobgate HTTP API
//!
//! This crate provides the Axum-based HTTP surface for Blobgate: the
//! catch-all object route, the health check and the metrics endpoint.

pub mod error;
pub mod routes;
pub mod state;
pub mod trace;

pub use error::ApiError;
pub use routes::create_router;
pub use routes::metrics::METRICS_ROUTE;
pub use state::{AppState, MetricsHandle};
