//! # Admin API Client
//!
//! Lets one-shot CLI commands hand their action to a running daemon, so the
//! action runs behind the daemon's cycle guard instead of racing its cycles.

use reqwest::{Client, Url};
use serde_json::Value;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::TransportError;

/// How long to wait for a daemon to accept the connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// HTTP client for a daemon's admin surface
#[derive(Debug, Clone)]
pub struct AdminClient {
    client: Client,
    base_url: Url,
}

impl AdminClient {
    /// Client for the daemon listening on `bind_address`.
    ///
    /// A wildcard bind (`0.0.0.0`, `[::]`) is reached over loopback.
    pub fn new(bind_address: &str) -> Result<Self, TransportError> {
        let host = match bind_address.parse::<SocketAddr>() {
            Ok(mut addr) => {
                if addr.ip().is_unspecified() {
                    let loopback: IpAddr = match addr {
                        SocketAddr::V4(_) => Ipv4Addr::LOCALHOST.into(),
                        SocketAddr::V6(_) => Ipv6Addr::LOCALHOST.into(),
                    };
                    addr.set_ip(loopback);
                }
                addr.to_string()
            }
            Err(_) => bind_address.to_string(),
        };

        let base_url = Url::parse(&format!("http://{host}/")).map_err(|e| {
            TransportError::Admin(format!("Invalid admin address '{bind_address}': {e}"))
        })?;
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("shop-monitor-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Admin(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Run `/actions/{action}` on the daemon.
    ///
    /// `Ok(None)` when no daemon is listening; the caller then runs the
    /// action itself.
    pub async fn run_action(&self, action: &str) -> Result<Option<Value>, TransportError> {
        let url = self
            .base_url
            .join(&format!("actions/{action}"))
            .map_err(|e| TransportError::Admin(format!("Invalid URL: {e}")))?;

        debug!(url = %url, "Forwarding action to daemon");
        let response = match self.client.post(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_connect() => {
                debug!(error = %e, "No daemon listening");
                return Ok(None);
            }
            Err(e) => return Err(TransportError::Admin(format!("Request failed: {e}"))),
        };

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransportError::Admin(format!(
                "{action} failed: {status} - {error_text}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TransportError::Admin(format!("Failed to parse response: {e}")))?;
        info!(action = %action, "Action completed by running daemon");
        Ok(Some(body))
    }
}
