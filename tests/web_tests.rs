mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

use common::server::{closed_address, spawn_server};
use common::TestHarness;
use shop_health_monitor::models::CheckResult;
use shop_health_monitor::scheduler::{MonitorScheduler, SchedulerConfig};
use shop_health_monitor::error::TransportError;
use shop_health_monitor::models::IncidentKind;
use shop_health_monitor::web::{create_app, AdminClient, AppState};

fn app_for(h: &TestHarness) -> axum::Router {
    let scheduler = MonitorScheduler::new(
        h.engine.clone(),
        SchedulerConfig {
            check_interval: Duration::from_secs(60),
            recovery_check_delay: Duration::from_secs(10),
            heartbeat_interval: Duration::from_secs(60),
        },
    );
    create_app(AppState::new(scheduler, "test"))
}

async fn send(app: axum::Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let h = TestHarness::with_script(CheckResult::healthy(), vec![]);

    let (status, body) = send(app_for(&h), "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["environment"], "test");
}

#[tokio::test]
async fn test_status_before_any_check() {
    let h = TestHarness::with_script(CheckResult::healthy(), vec![]);

    let (status, body) = send(app_for(&h), "GET", "/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "unknown");
    assert!(body["last_check"].is_null());
    assert_eq!(body["recent"], serde_json::json!([]));
    assert_eq!(body["recovery_check_pending"], false);
}

#[tokio::test]
async fn test_manual_check_runs_a_cycle() {
    let h = TestHarness::with_script(CheckResult::healthy(), vec![]);
    let app = app_for(&h);

    let (status, body) = send(app.clone(), "POST", "/actions/check").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Health check completed.");
    assert_eq!(body["state"], "ok");
    assert_eq!(body["transition"]["type"], "steady");

    let (_, dashboard) = send(app, "GET", "/status").await;
    assert_eq!(dashboard["status"], "ok");
    assert!(dashboard["last_check"].is_string());
}

#[tokio::test]
async fn test_manual_check_with_unavailable_catalog() {
    let h = TestHarness::with_script(CheckResult::healthy(), vec![]);
    h.probe.push_unavailable();

    let (status, body) = send(app_for(&h), "POST", "/actions/check").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Health check skipped: catalog unavailable.");
    assert!(body["transition"].is_null());
}

#[tokio::test]
async fn test_manual_test_alert() {
    let h = TestHarness::with_script(CheckResult::healthy(), vec![]);
    let app = app_for(&h);

    let (status, body) = send(app.clone(), "POST", "/actions/test-alerts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Test alert sent and cache flushed.");
    assert_eq!(body["dispatch"]["email_sent"], true);
    assert_eq!(
        body["remediation"]["backends_invoked"],
        serde_json::json!(["Edge Cache", "Page Cache"])
    );

    let (_, dashboard) = send(app, "GET", "/status").await;
    assert_eq!(dashboard["recent"][1]["type"], "test");
    assert_eq!(dashboard["recent"][0]["type"], "info");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let h = TestHarness::with_script(CheckResult::healthy(), vec![]);
    let response = app_for(&h)
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_client_runs_actions_on_the_daemon() {
    let h = TestHarness::with_script(CheckResult::healthy(), vec![]);
    let base = spawn_server(app_for(&h)).await;
    let client = AdminClient::new(base.trim_start_matches("http://")).unwrap();

    let reply = client.run_action("test-alerts").await.unwrap().unwrap();

    assert_eq!(reply["message"], "Test alert sent and cache flushed.");
    assert_eq!(h.count_incidents(IncidentKind::Test), 1);
}

#[tokio::test]
async fn test_admin_client_without_daemon_returns_none() {
    let client = AdminClient::new(&closed_address().await).unwrap();
    assert!(client.run_action("check").await.unwrap().is_none());
}

#[tokio::test]
async fn test_admin_client_reports_rejected_actions() {
    let h = TestHarness::with_script(CheckResult::healthy(), vec![]);
    let base = spawn_server(app_for(&h)).await;
    let client = AdminClient::new(base.trim_start_matches("http://")).unwrap();

    let result = client.run_action("reboot").await;

    assert!(matches!(result, Err(TransportError::Admin(reason)) if reason.contains("404")));
}
