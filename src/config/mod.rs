//! # Monitor Configuration
//!
//! YAML-based configuration with environment-specific overrides, loaded by
//! [`ConfigManager`]. Every section has defaults so a minimal file only needs
//! the values that differ per deployment (admin email, catalog URLs, webhook).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use shop_health_monitor::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let interval = manager.config().check_interval();
//! let settings = manager.config().settings();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Longest webhook timeout accepted; the webhook runs inside the cycle
const MAX_WEBHOOK_TIMEOUT_SECONDS: u64 = 30;

/// Root configuration structure mirroring shop-monitor.yaml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Cycle cadence and timing of follow-up checks
    pub monitor: MonitorTimingConfig,

    /// Alert recipients and channels
    pub alerts: AlertsConfig,

    /// Catalog endpoints used by the HTTP probe
    pub catalog: CatalogConfig,

    /// Where the persisted state record lives
    pub storage: StorageConfig,

    /// Administrative HTTP surface
    pub admin: AdminConfig,

    /// Cache backends in descending priority
    pub cache_backends: Vec<CacheBackendConfig>,

    /// Active environment, set by the loader
    #[serde(skip)]
    pub environment: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorTimingConfig {
    pub check_interval_minutes: u64,
    pub recovery_check_delay_seconds: u64,
    /// Pause before the in-cycle re-probe after a new failure
    pub reprobe_delay_ms: u64,
    pub stall_threshold_seconds: u64,
    pub heartbeat_interval_seconds: u64,
}

impl Default for MonitorTimingConfig {
    fn default() -> Self {
        Self {
            check_interval_minutes: 1,
            recovery_check_delay_seconds: 10,
            reprobe_delay_ms: 2000,
            stall_threshold_seconds: 300,
            heartbeat_interval_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub admin_email: String,
    pub webhook_url: Option<String>,
    pub webhook_timeout_seconds: u64,
    /// Appended to failure and desync alert bodies
    pub site_url: String,
    /// When unset, mail is only logged
    pub sendmail_path: Option<PathBuf>,
    pub from_address: Option<String>,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            admin_email: String::new(),
            webhook_url: None,
            webhook_timeout_seconds: 5,
            site_url: String::new(),
            sendmail_path: None,
            from_address: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Backing store listing of published items
    pub products_url: String,
    /// Customer-facing listing, possibly served through caches
    pub storefront_url: String,
    pub timeout_seconds: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            products_url: String::new(),
            storefront_url: String::new(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub state_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("var/shop-monitor-state.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    pub enabled: bool,
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1:8089".to_string(),
        }
    }
}

/// One entry of the `cache_backends` list
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheBackendConfig {
    pub name: String,
    #[serde(flatten)]
    pub kind: CacheBackendKind,
    #[serde(default = "default_purge_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CacheBackendKind {
    /// Purge request against an HTTP endpoint (edge or page cache)
    HttpPurge {
        url: String,
        #[serde(default = "default_purge_method")]
        method: String,
        #[serde(default)]
        headers: HashMap<String, String>,
        #[serde(default = "default_true")]
        enabled: bool,
    },
    /// Local program that clears a cache (e.g. a CLI flush command)
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
    /// Universal fallback; runs a command or URL when given, else a no-op
    ObjectCache {
        #[serde(default)]
        program: Option<String>,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        url: Option<String>,
    },
}

fn default_purge_timeout_seconds() -> u64 {
    10
}

fn default_purge_method() -> String {
    "POST".to_string()
}

fn default_true() -> bool {
    true
}

/// Per-invocation settings snapshot read by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub webhook_url: Option<String>,
    pub check_interval_minutes: u64,
}

impl MonitorConfig {
    pub fn settings(&self) -> Settings {
        Settings {
            webhook_url: self.webhook_url().map(str::to_string),
            check_interval_minutes: self.monitor.check_interval_minutes,
        }
    }

    /// Configured webhook URL, ignoring blank values
    pub fn webhook_url(&self) -> Option<&str> {
        self.alerts
            .webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.monitor.check_interval_minutes * 60)
    }

    pub fn recovery_check_delay(&self) -> Duration {
        Duration::from_secs(self.monitor.recovery_check_delay_seconds)
    }

    pub fn reprobe_delay(&self) -> Duration {
        Duration::from_millis(self.monitor.reprobe_delay_ms)
    }

    pub fn stall_threshold(&self) -> Duration {
        Duration::from_secs(self.monitor.stall_threshold_seconds)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.monitor.heartbeat_interval_seconds)
    }

    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.alerts.webhook_timeout_seconds)
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog.timeout_seconds)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.monitor.check_interval_minutes == 0 {
            return Err(ConfigurationError::invalid_value(
                "monitor.check_interval_minutes",
                "0",
                "must be a positive number of minutes",
            ));
        }

        if self.monitor.stall_threshold_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "monitor.stall_threshold_seconds",
                "0",
                "must be positive",
            ));
        }

        if self.monitor.heartbeat_interval_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "monitor.heartbeat_interval_seconds",
                "0",
                "must be positive",
            ));
        }

        let timeout = self.alerts.webhook_timeout_seconds;
        if timeout == 0 || timeout > MAX_WEBHOOK_TIMEOUT_SECONDS {
            return Err(ConfigurationError::invalid_value(
                "alerts.webhook_timeout_seconds",
                timeout.to_string(),
                format!("must be between 1 and {MAX_WEBHOOK_TIMEOUT_SECONDS} seconds"),
            ));
        }

        if self.alerts.admin_email.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "admin_email",
                "alerts",
            ));
        }

        if let Some(url) = self.webhook_url() {
            if !is_http_url(url) {
                return Err(ConfigurationError::invalid_value(
                    "alerts.webhook_url",
                    "[REDACTED]",
                    "must be an http(s) URL",
                ));
            }
        }

        self.validate_cache_backends()
    }

    fn validate_cache_backends(&self) -> ConfigResult<()> {
        let mut fallbacks = 0;

        for (index, backend) in self.cache_backends.iter().enumerate() {
            if backend.name.trim().is_empty() {
                return Err(ConfigurationError::missing_required_field(
                    "name",
                    format!("cache_backends[{index}]"),
                ));
            }

            match &backend.kind {
                CacheBackendKind::HttpPurge { url, .. } if !is_http_url(url) => {
                    return Err(ConfigurationError::invalid_value(
                        format!("cache_backends[{index}].url"),
                        url.clone(),
                        "must be an http(s) URL",
                    ));
                }
                CacheBackendKind::Command { program, .. } if program.trim().is_empty() => {
                    return Err(ConfigurationError::missing_required_field(
                        "program",
                        format!("cache_backends[{index}]"),
                    ));
                }
                CacheBackendKind::ObjectCache { .. } => fallbacks += 1,
                _ => {}
            }
        }

        if fallbacks > 1 {
            return Err(ConfigurationError::invalid_value(
                "cache_backends",
                fallbacks.to_string(),
                "at most one object_cache fallback may be configured",
            ));
        }

        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
