//! # Admin Web Surface
//!
//! Small axum app for operators: liveness, the dashboard, and the two manual
//! actions. Served by the daemon when `admin.enabled` is set; one-shot CLI
//! commands reach it through [`AdminClient`].

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

pub mod client;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use client::AdminClient;
pub use errors::{ApiError, ApiResult};
pub use state::AppState;

/// Build the admin application with all routes
pub fn create_app(state: AppState) -> Router {
    let app = Router::new()
        .merge(routes::health_routes())
        .merge(routes::action_routes())
        .with_state(state);

    info!("Admin web application created");
    app
}

/// Serve until `shutdown` flips to `true` or its sender is dropped
pub async fn serve(
    bind_address: &str,
    state: AppState,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_address).await?;
    info!(address = %listener.local_addr()?, "🌐 Admin surface listening");

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(async move {
            while shutdown.changed().await.is_ok() {
                if *shutdown.borrow() {
                    break;
                }
            }
        })
        .await
}
