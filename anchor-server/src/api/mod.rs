//! API Module
//!
//! HTTP API layer for the baseline service.

pub mod baseline;
pub mod error;
pub mod health;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::service::BaselineService;

/// Create the main API router with all endpoints
pub fn create_router(service: Arc<BaselineService>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Baseline endpoints
        .route(
            "/app/{app_id}/execution/{execution_id}/baseline",
            post(baseline::mark_baseline),
        )
        .route(
            "/app/{app_id}/baseline/details",
            get(baseline::get_baseline_details),
        )
        .route(
            "/app/{app_id}/workflow/{workflow_id}/baselines",
            get(baseline::list_baselines),
        )
        // Add state and middleware
        .with_state(service)
        .layer(TraceLayer::new_for_http())
}
