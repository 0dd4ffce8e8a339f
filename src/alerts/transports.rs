//! Concrete notification transports.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::info;

use super::{Mailer, WebhookTransport};
use crate::error::TransportError;

/// Raw bytes per encoded word; 45 bytes encode to 60 characters, keeping
/// each `=?UTF-8?B?...?=` word inside the 75 character limit
const ENCODED_WORD_CHUNK_BYTES: usize = 45;

/// Header text as RFC 2047 `B` encoded words when it is not plain ASCII.
///
/// Words split on character boundaries and fold onto continuation lines.
pub fn encode_header_value(value: &str) -> String {
    if value.is_ascii() {
        return value.to_string();
    }

    let mut words = Vec::new();
    let mut chunk = String::new();
    for ch in value.chars() {
        if chunk.len() + ch.len_utf8() > ENCODED_WORD_CHUNK_BYTES {
            words.push(format!("=?UTF-8?B?{}?=", STANDARD.encode(&chunk)));
            chunk.clear();
        }
        chunk.push(ch);
    }
    if !chunk.is_empty() {
        words.push(format!("=?UTF-8?B?{}?=", STANDARD.encode(&chunk)));
    }
    words.join("\r\n ")
}

/// Hands a plain-text message to a local `sendmail -t`
#[derive(Debug, Clone)]
pub struct SendmailMailer {
    sendmail_path: PathBuf,
    from_address: Option<String>,
    timeout: Duration,
}

impl SendmailMailer {
    pub fn new(sendmail_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            sendmail_path: sendmail_path.into(),
            from_address: None,
            timeout,
        }
    }

    pub fn with_from_address(mut self, from: impl Into<String>) -> Self {
        self.from_address = Some(from.into());
        self
    }

    /// RFC 5322 message with a UTF-8 plain-text body and an encoded subject
    pub fn render_message(&self, recipient: &str, subject: &str, body: &str) -> String {
        let mut message = String::new();
        if let Some(from) = &self.from_address {
            message.push_str(&format!("From: {from}\r\n"));
        }
        message.push_str(&format!("To: {recipient}\r\n"));
        message.push_str(&format!("Subject: {}\r\n", encode_header_value(subject)));
        message.push_str("MIME-Version: 1.0\r\n");
        message.push_str("Content-Type: text/plain; charset=UTF-8\r\n");
        message.push_str("Content-Transfer-Encoding: 8bit\r\n\r\n");
        message.push_str(&body.replace('\n', "\r\n"));
        message.push_str("\r\n");
        message
    }

    async fn deliver(&self, message: String) -> Result<(), TransportError> {
        let mut child = Command::new(&self.sendmail_path)
            .arg("-t")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TransportError::Mail(format!("cannot spawn sendmail: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(message.as_bytes())
                .await
                .map_err(|e| TransportError::Mail(format!("cannot write message: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| TransportError::Mail(e.to_string()))?;
        if !output.status.success() {
            return Err(TransportError::Mail(format!(
                "sendmail exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Mailer for SendmailMailer {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), TransportError> {
        let message = self.render_message(recipient, subject, body);
        tokio::time::timeout(self.timeout, self.deliver(message))
            .await
            .map_err(|_| {
                TransportError::Mail(format!("sendmail timed out after {}s", self.timeout.as_secs()))
            })?
    }
}

/// Mailer that only records the message in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), TransportError> {
        info!(
            recipient = %recipient,
            subject = %subject,
            body = %body,
            "✉️ Email alert (no sendmail configured)"
        );
        Ok(())
    }
}

/// JSON webhook delivery over a shared reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestWebhook {
    client: Client,
}

impl ReqwestWebhook {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WebhookTransport for ReqwestWebhook {
    async fn post(
        &self,
        url: &str,
        payload: &serde_json::Value,
        timeout: Duration,
    ) -> Result<(), TransportError> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::WebhookTimeout {
                        timeout_secs: timeout.as_secs(),
                    }
                } else {
                    TransportError::Webhook(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::WebhookStatus {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
