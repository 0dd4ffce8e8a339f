use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{Alert, Mailer, WebhookTransport};

/// What each channel did for one alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub email_sent: bool,
    /// `None` when no webhook is configured or the channel was not attempted
    pub webhook_sent: Option<bool>,
}

/// Fans alerts out to the mail and webhook channels
pub struct AlertDispatcher {
    mailer: Arc<dyn Mailer>,
    webhook: Arc<dyn WebhookTransport>,
    recipient: String,
    webhook_timeout: Duration,
}

impl std::fmt::Debug for AlertDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertDispatcher")
            .field("recipient", &self.recipient)
            .field("webhook_timeout", &self.webhook_timeout)
            .finish_non_exhaustive()
    }
}

impl AlertDispatcher {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        webhook: Arc<dyn WebhookTransport>,
        recipient: impl Into<String>,
        webhook_timeout: Duration,
    ) -> Self {
        Self {
            mailer,
            webhook,
            recipient: recipient.into(),
            webhook_timeout,
        }
    }

    /// Send to both channels concurrently; the webhook only when configured.
    pub async fn alert(&self, alert: &Alert, webhook_url: Option<&str>) -> DispatchReport {
        let (email_sent, webhook_sent) = tokio::join!(self.send_email(alert), async {
            match webhook_url {
                Some(url) => Some(self.send_webhook(alert, url).await),
                None => None,
            }
        });

        info!(
            kind = %alert.kind,
            subject = %alert.subject,
            email_sent = email_sent,
            webhook_sent = ?webhook_sent,
            "📣 Alert dispatched"
        );

        DispatchReport {
            email_sent,
            webhook_sent,
        }
    }

    /// Webhook-only delivery used for heartbeat alerts
    pub async fn webhook_only(&self, alert: &Alert, webhook_url: Option<&str>) -> DispatchReport {
        let webhook_sent = match webhook_url {
            Some(url) => Some(self.send_webhook(alert, url).await),
            None => {
                debug!(kind = %alert.kind, "No webhook configured; heartbeat alert dropped");
                None
            }
        };

        DispatchReport {
            email_sent: false,
            webhook_sent,
        }
    }

    async fn send_email(&self, alert: &Alert) -> bool {
        match self
            .mailer
            .send(&self.recipient, &alert.subject, &alert.body)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(kind = %alert.kind, error = %e, "Email alert failed");
                false
            }
        }
    }

    async fn send_webhook(&self, alert: &Alert, url: &str) -> bool {
        let payload = json!({ "text": alert.webhook_text() });

        // Bound the call here too, whatever the transport does
        let result = tokio::time::timeout(
            self.webhook_timeout,
            self.webhook.post(url, &payload, self.webhook_timeout),
        )
        .await;

        match result {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(kind = %alert.kind, error = %e, "Webhook alert failed");
                false
            }
            Err(_) => {
                warn!(
                    kind = %alert.kind,
                    timeout_secs = self.webhook_timeout.as_secs(),
                    "Webhook alert timed out"
                );
                false
            }
        }
    }
}
