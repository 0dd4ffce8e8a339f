//! Error types for the shop health monitor.
//!
//! Only state-store failures ever reach a caller of a running engine;
//! configuration and backend errors surface while wiring it. At runtime,
//! probe, purge, and transport errors are handled at their call boundary and
//! turned into log lines or skipped cycles.

use thiserror::Error;

use crate::config::ConfigurationError;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("State store error: {0}")]
    Store(#[from] StoreError),
    #[error("Catalog probe error: {0}")]
    Probe(#[from] ProbeError),
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Cache backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the persisted state store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O failure on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Corrupt value for key '{key}': {reason}")]
    Corrupt { key: String, reason: String },
    #[error("Serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn corrupt(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Failures of the catalog probe
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbeError {
    /// Catalog layer not reachable or not installed
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
    /// Catalog answered with something we cannot interpret
    #[error("Invalid catalog response from {source_name}: {reason}")]
    InvalidResponse { source_name: String, reason: String },
}

/// Failure of a single cache backend purge
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Cache backend '{backend}' purge failed: {reason}")]
pub struct BackendError {
    pub backend: String,
    pub reason: String,
}

impl BackendError {
    pub fn new(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of a notification channel
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    #[error("Mail delivery failed: {0}")]
    Mail(String),
    #[error("Webhook request timed out after {timeout_secs}s")]
    WebhookTimeout { timeout_secs: u64 },
    #[error("Webhook returned HTTP {status}")]
    WebhookStatus { status: u16 },
    #[error("Webhook request failed: {0}")]
    Webhook(String),
    #[error("Admin request failed: {0}")]
    Admin(String),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
