//! Admin route definitions grouped by concern.

use axum::{
    routing::{get, post},
    Router,
};

use crate::web::{handlers, state::AppState};

/// Read-only routes: liveness and dashboard
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::basic_health))
        .route("/status", get(handlers::health::status))
}

/// Operator-triggered actions
pub fn action_routes() -> Router<AppState> {
    Router::new()
        .route("/actions/check", post(handlers::actions::run_check))
        .route("/actions/test-alerts", post(handlers::actions::run_test_alert))
}
