//! # Alerts
//!
//! Two fixed channels: mail to the site administrator, and an optional chat
//! webhook. Both are best effort and independent of each other; neither ever
//! reports an error to the engine.

pub mod composer;
pub mod dispatcher;
pub mod transports;

use async_trait::async_trait;
use std::time::Duration;

use crate::error::TransportError;

pub use composer::{Alert, AlertKind};
pub use dispatcher::{AlertDispatcher, DispatchReport};
pub use transports::{LogMailer, ReqwestWebhook, SendmailMailer};

/// Outbound mail primitive
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), TransportError>;
}

/// Outbound HTTP POST primitive for chat webhooks
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        payload: &serde_json::Value,
        timeout: Duration,
    ) -> Result<(), TransportError>;
}
