//! # Manual Action Handlers
//!
//! Both actions run synchronously under the engine's cycle guard and reply
//! once the work is done.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::engine::{CycleReport, TestAlertReport};
use crate::web::errors::{ApiError, ApiResult};
use crate::web::state::AppState;

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    message: String,
    #[serde(flatten)]
    report: CycleReport,
}

#[derive(Debug, Serialize)]
pub struct TestAlertResponse {
    message: String,
    #[serde(flatten)]
    report: TestAlertReport,
}

/// Manual reconcile: POST /actions/check
pub async fn run_check(State(state): State<AppState>) -> ApiResult<Json<CheckResponse>> {
    info!("Manual health check requested");
    let report = state
        .scheduler
        .run_cycle()
        .await
        .ok_or_else(|| ApiError::store_unavailable("reconcile"))?;

    let message = if report.was_skipped() {
        "Health check skipped: catalog unavailable."
    } else {
        "Health check completed."
    };
    Ok(Json(CheckResponse {
        message: message.to_string(),
        report,
    }))
}

/// Manual test alert and flush: POST /actions/test-alerts
pub async fn run_test_alert(
    State(state): State<AppState>,
) -> ApiResult<Json<TestAlertResponse>> {
    info!("Manual test alert requested");
    let report = state.engine().run_test_alert().await?;
    Ok(Json(TestAlertResponse {
        message: "Test alert sent and cache flushed.".to_string(),
        report,
    }))
}
