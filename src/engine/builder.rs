use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::reconciler::ReconciliationEngine;
use super::stall::StallDetector;
use crate::alerts::{AlertDispatcher, LogMailer, Mailer, ReqwestWebhook, SendmailMailer, WebhookTransport};
use crate::clock::{Clock, SystemClock};
use crate::config::{MonitorConfig, Settings};
use crate::constants::{
    DEFAULT_MAIL_TIMEOUT, DEFAULT_REPROBE_DELAY, DEFAULT_STALL_THRESHOLD, DEFAULT_WEBHOOK_TIMEOUT,
};
use crate::error::Result;
use crate::incident_log::IncidentLog;
use crate::probe::{CatalogProbe, HttpCatalogProbe};
use crate::remediation::{build_backends, CacheBackend, ObjectCacheBackend, RemediationDispatcher};
use crate::store::{MonitorState, StateStore};

/// Assembles a [`ReconciliationEngine`] from its collaborators.
///
/// Everything except the store and the probe has a working default, so tests
/// only override what they observe.
pub struct EngineBuilder {
    store: Arc<dyn StateStore>,
    probe: Arc<dyn CatalogProbe>,
    backends: Vec<Arc<dyn CacheBackend>>,
    fallback: Arc<dyn CacheBackend>,
    mailer: Arc<dyn Mailer>,
    webhook: Option<Arc<dyn WebhookTransport>>,
    clock: Arc<dyn Clock>,
    settings: Settings,
    admin_email: String,
    site_url: String,
    reprobe_delay: Duration,
    stall_threshold: Duration,
    webhook_timeout: Duration,
}

impl EngineBuilder {
    pub fn new(store: Arc<dyn StateStore>, probe: Arc<dyn CatalogProbe>) -> Self {
        Self {
            store,
            probe,
            backends: Vec::new(),
            fallback: Arc::new(ObjectCacheBackend::noop()),
            mailer: Arc::new(LogMailer),
            webhook: None,
            clock: Arc::new(SystemClock),
            settings: Settings {
                webhook_url: None,
                check_interval_minutes: 1,
            },
            admin_email: String::new(),
            site_url: String::new(),
            reprobe_delay: DEFAULT_REPROBE_DELAY,
            stall_threshold: DEFAULT_STALL_THRESHOLD,
            webhook_timeout: DEFAULT_WEBHOOK_TIMEOUT,
        }
    }

    /// Wire production collaborators from loaded configuration
    pub fn from_config(
        config: &MonitorConfig,
        store: Arc<dyn StateStore>,
        client: Client,
    ) -> Result<Self> {
        let probe = HttpCatalogProbe::new(client.clone(), &config.catalog)?;
        let (backends, fallback) = build_backends(&config.cache_backends, &client)?;

        let mailer: Arc<dyn Mailer> = match &config.alerts.sendmail_path {
            Some(path) => {
                let mut mailer = SendmailMailer::new(path, DEFAULT_MAIL_TIMEOUT);
                if let Some(from) = &config.alerts.from_address {
                    mailer = mailer.with_from_address(from);
                }
                Arc::new(mailer)
            }
            None => Arc::new(LogMailer),
        };

        Ok(Self::new(store, Arc::new(probe))
            .with_backends(backends)
            .with_fallback(fallback)
            .with_mailer(mailer)
            .with_webhook(Arc::new(ReqwestWebhook::new(client)))
            .with_settings(config.settings())
            .with_admin_email(&config.alerts.admin_email)
            .with_site_url(&config.alerts.site_url)
            .with_reprobe_delay(config.reprobe_delay())
            .with_stall_threshold(config.stall_threshold())
            .with_webhook_timeout(config.webhook_timeout()))
    }

    /// Named backends in descending priority
    pub fn with_backends(mut self, backends: Vec<Arc<dyn CacheBackend>>) -> Self {
        self.backends = backends;
        self
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn CacheBackend>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    pub fn with_webhook(mut self, webhook: Arc<dyn WebhookTransport>) -> Self {
        self.webhook = Some(webhook);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_admin_email(mut self, email: impl Into<String>) -> Self {
        self.admin_email = email.into();
        self
    }

    pub fn with_site_url(mut self, site_url: impl Into<String>) -> Self {
        self.site_url = site_url.into();
        self
    }

    pub fn with_reprobe_delay(mut self, delay: Duration) -> Self {
        self.reprobe_delay = delay;
        self
    }

    pub fn with_stall_threshold(mut self, threshold: Duration) -> Self {
        self.stall_threshold = threshold;
        self
    }

    pub fn with_webhook_timeout(mut self, timeout: Duration) -> Self {
        self.webhook_timeout = timeout;
        self
    }

    pub fn build(self) -> ReconciliationEngine {
        let state = MonitorState::new(self.store);
        let incidents = IncidentLog::new(state.clone(), self.clock.clone());
        let remediation = RemediationDispatcher::new(
            self.backends,
            self.fallback,
            state.clone(),
            incidents.clone(),
            self.clock.clone(),
        );
        let webhook = self
            .webhook
            .unwrap_or_else(|| Arc::new(ReqwestWebhook::new(Client::new())));
        let alerts = AlertDispatcher::new(self.mailer, webhook, self.admin_email, self.webhook_timeout);

        ReconciliationEngine {
            state,
            incidents,
            probe: self.probe,
            remediation,
            alerts,
            stall: StallDetector::new(self.stall_threshold),
            clock: self.clock,
            settings: self.settings,
            site_url: self.site_url,
            reprobe_delay: self.reprobe_delay,
            cycle_guard: Mutex::new(()),
        }
    }
}
