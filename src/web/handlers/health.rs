//! # Health and Status Handlers

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::debug;

use crate::engine::DashboardSnapshot;
use crate::web::errors::ApiResult;
use crate::web::state::AppState;

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    environment: String,
    uptime_seconds: i64,
}

/// Dashboard response: snapshot plus scheduler bookkeeping
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    dashboard: DashboardSnapshot,
    recovery_check_pending: bool,
}

/// Liveness: GET /health
///
/// Always answers while the process is up; says nothing about the shop.
pub async fn basic_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let now = chrono::Utc::now();
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: now.to_rfc3339(),
        environment: state.environment.clone(),
        uptime_seconds: (now - state.started_at).num_seconds(),
    })
}

/// Dashboard: GET /status
pub async fn status(State(state): State<AppState>) -> ApiResult<Json<StatusResponse>> {
    debug!("Reading dashboard snapshot");
    let dashboard = state.engine().dashboard()?;
    Ok(Json(StatusResponse {
        dashboard,
        recovery_check_pending: state.scheduler.recovery_check_pending(),
    }))
}
