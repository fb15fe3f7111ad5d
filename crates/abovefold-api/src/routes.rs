//! HTTP route definitions.
//!
//! ```text
//! /api
//!   POST /api/extract - Extract critical CSS (GET yields 405)
//!
//! /healthz - Liveness probe
//! ```

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{extract, healthz};
use crate::state::ApiState;

/// Build the service router. The extraction endpoint is called from build
/// tooling and browser-based dashboards alike, so cross-origin requests are
/// allowed.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/extract", post(extract))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
