#![allow(dead_code)]

pub mod mocks;
pub mod server;
pub mod strategies;

use std::sync::Arc;
use std::time::Duration;

use shop_health_monitor::clock::ManualClock;
use shop_health_monitor::config::Settings;
use shop_health_monitor::engine::ReconciliationEngine;
use shop_health_monitor::models::{CheckResult, IncidentKind, IncidentRecord};
use shop_health_monitor::remediation::CacheBackend;
use shop_health_monitor::store::MemoryStateStore;

use mocks::{MockBackend, MockMailer, MockProbe, MockWebhook};

pub const ADMIN_EMAIL: &str = "admin@shop.example.com";
pub const WEBHOOK_URL: &str = "https://hooks.example.com/services/monitor";
pub const SITE_URL: &str = "https://shop.example.com";

/// An engine wired to recording mocks, with handles kept for assertions
pub struct TestHarness {
    pub engine: Arc<ReconciliationEngine>,
    pub probe: Arc<MockProbe>,
    pub backends: Vec<Arc<MockBackend>>,
    pub fallback: Arc<MockBackend>,
    pub mailer: Arc<MockMailer>,
    pub webhook: Arc<MockWebhook>,
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryStateStore>,
}

pub struct TestHarnessBuilder {
    probe: MockProbe,
    backends: Vec<MockBackend>,
    mailer: MockMailer,
    webhook: MockWebhook,
    webhook_url: Option<String>,
    webhook_timeout: Duration,
    stall_threshold: Duration,
}

impl TestHarnessBuilder {
    pub fn new(probe: MockProbe) -> Self {
        Self {
            probe,
            backends: vec![MockBackend::new("Edge Cache"), MockBackend::new("Page Cache")],
            mailer: MockMailer::new(),
            webhook: MockWebhook::new(),
            webhook_url: Some(WEBHOOK_URL.to_string()),
            webhook_timeout: Duration::from_secs(5),
            stall_threshold: Duration::from_secs(300),
        }
    }

    pub fn backends(mut self, backends: Vec<MockBackend>) -> Self {
        self.backends = backends;
        self
    }

    pub fn mailer(mut self, mailer: MockMailer) -> Self {
        self.mailer = mailer;
        self
    }

    pub fn webhook(mut self, webhook: MockWebhook) -> Self {
        self.webhook = webhook;
        self
    }

    pub fn without_webhook_url(mut self) -> Self {
        self.webhook_url = None;
        self
    }

    pub fn webhook_timeout(mut self, timeout: Duration) -> Self {
        self.webhook_timeout = timeout;
        self
    }

    pub fn build(self) -> TestHarness {
        let probe = Arc::new(self.probe);
        let backends: Vec<Arc<MockBackend>> = self.backends.into_iter().map(Arc::new).collect();
        let fallback = Arc::new(MockBackend::new("Object Cache"));
        let mailer = Arc::new(self.mailer);
        let webhook = Arc::new(self.webhook);
        let clock = Arc::new(ManualClock::default());
        let store = Arc::new(MemoryStateStore::new());

        let dyn_backends: Vec<Arc<dyn CacheBackend>> = backends
            .iter()
            .map(|b| b.clone() as Arc<dyn CacheBackend>)
            .collect();

        let engine = ReconciliationEngine::builder(store.clone(), probe.clone())
            .with_backends(dyn_backends)
            .with_fallback(fallback.clone())
            .with_mailer(mailer.clone())
            .with_webhook(webhook.clone())
            .with_clock(clock.clone())
            .with_settings(Settings {
                webhook_url: self.webhook_url,
                check_interval_minutes: 1,
            })
            .with_admin_email(ADMIN_EMAIL)
            .with_site_url(SITE_URL)
            .with_webhook_timeout(self.webhook_timeout)
            .with_reprobe_delay(Duration::ZERO)
            .with_stall_threshold(self.stall_threshold)
            .build();

        TestHarness {
            engine: Arc::new(engine),
            probe,
            backends,
            fallback,
            mailer,
            webhook,
            clock,
            store,
        }
    }
}

impl TestHarness {
    /// Harness whose probe reports `default` after the scripted answers
    pub fn with_script(default: CheckResult, script: Vec<CheckResult>) -> Self {
        TestHarnessBuilder::new(MockProbe::new(default).with_script(script)).build()
    }

    pub fn incidents(&self) -> Vec<IncidentRecord> {
        self.engine.incidents().recent(20).unwrap()
    }

    pub fn incident_kinds(&self) -> Vec<IncidentKind> {
        self.incidents().into_iter().map(|r| r.kind).collect()
    }

    pub fn count_incidents(&self, kind: IncidentKind) -> usize {
        self.incidents().iter().filter(|r| r.kind == kind).count()
    }

    pub fn total_purges(&self) -> usize {
        self.backends.iter().map(|b| b.purges()).sum::<usize>() + self.fallback.purges()
    }
}
