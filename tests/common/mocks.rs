//! Recording mocks for the monitor's external collaborators.
//!
//! Each mock keeps its observations in an `Arc<Mutex<State>>` and exposes a
//! `get_state()` snapshot for assertions. Failure and latency are toggled with
//! builder methods.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use shop_health_monitor::alerts::{Mailer, WebhookTransport};
use shop_health_monitor::error::{BackendError, ProbeError, TransportError};
use shop_health_monitor::models::CheckResult;
use shop_health_monitor::probe::CatalogProbe;
use shop_health_monitor::remediation::CacheBackend;

/// Probe state: scripted answers, then a steady default
#[derive(Debug, Clone)]
pub struct MockProbeState {
    pub scripted: VecDeque<Result<CheckResult, ProbeError>>,
    pub default: CheckResult,
    pub calls: usize,
}

pub struct MockProbe {
    state: Arc<Mutex<MockProbeState>>,
    delay: Option<Duration>,
}

impl MockProbe {
    /// Probe that answers `default` once its script runs out
    pub fn new(default: CheckResult) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockProbeState {
                scripted: VecDeque::new(),
                default,
                calls: 0,
            })),
            delay: None,
        }
    }

    /// Queue answers consumed one per probe call
    pub fn with_script(self, results: Vec<CheckResult>) -> Self {
        self.state
            .lock()
            .unwrap()
            .scripted
            .extend(results.into_iter().map(Ok));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push(&self, result: CheckResult) {
        self.state.lock().unwrap().scripted.push_back(Ok(result));
    }

    pub fn push_unavailable(&self) {
        self.state
            .lock()
            .unwrap()
            .scripted
            .push_back(Err(ProbeError::Unavailable("catalog not installed".into())));
    }

    pub fn set_default(&self, result: CheckResult) {
        self.state.lock().unwrap().default = result;
    }

    pub fn get_state(&self) -> MockProbeState {
        self.state.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogProbe for MockProbe {
    async fn probe_emptiness(&self) -> Result<CheckResult, ProbeError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        let default = state.default;
        state.scripted.pop_front().unwrap_or(Ok(default))
    }
}

#[derive(Debug, Default, Clone)]
pub struct MockBackendState {
    pub purges: usize,
    pub activity_checks: usize,
}

pub struct MockBackend {
    name: String,
    active: bool,
    failing: bool,
    state: Arc<Mutex<MockBackendState>>,
}

impl MockBackend {
    /// Active, succeeding backend
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            failing: false,
            state: Arc::new(Mutex::new(MockBackendState::default())),
        }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn get_state(&self) -> MockBackendState {
        self.state.lock().unwrap().clone()
    }

    pub fn purges(&self) -> usize {
        self.get_state().purges
    }
}

#[async_trait]
impl CacheBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_active(&self) -> bool {
        self.state.lock().unwrap().activity_checks += 1;
        self.active
    }

    async fn purge(&self) -> Result<(), BackendError> {
        self.state.lock().unwrap().purges += 1;
        if self.failing {
            return Err(BackendError::new(&self.name, "simulated purge failure"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Default, Clone)]
pub struct MockMailerState {
    pub attempts: usize,
    pub sent: Vec<SentMail>,
}

#[derive(Default)]
pub struct MockMailer {
    failing: bool,
    state: Arc<Mutex<MockMailerState>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn get_state(&self) -> MockMailerState {
        self.state.lock().unwrap().clone()
    }

    pub fn subjects(&self) -> Vec<String> {
        self.get_state().sent.into_iter().map(|m| m.subject).collect()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        state.attempts += 1;
        if self.failing {
            return Err(TransportError::Mail("simulated mail outage".into()));
        }
        state.sent.push(SentMail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookPost {
    pub url: String,
    pub text: String,
}

#[derive(Debug, Default, Clone)]
pub struct MockWebhookState {
    pub attempts: Vec<WebhookPost>,
    pub delivered: Vec<WebhookPost>,
}

#[derive(Default)]
pub struct MockWebhook {
    /// Simulates a hung endpoint
    hang_for: Option<Duration>,
    failing: bool,
    state: Arc<Mutex<MockWebhookState>>,
}

impl MockWebhook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hanging(mut self, duration: Duration) -> Self {
        self.hang_for = Some(duration);
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn get_state(&self) -> MockWebhookState {
        self.state.lock().unwrap().clone()
    }

    pub fn delivered_texts(&self) -> Vec<String> {
        self.get_state().delivered.into_iter().map(|p| p.text).collect()
    }
}

#[async_trait]
impl WebhookTransport for MockWebhook {
    async fn post(
        &self,
        url: &str,
        payload: &serde_json::Value,
        _timeout: Duration,
    ) -> Result<(), TransportError> {
        let post = WebhookPost {
            url: url.to_string(),
            text: payload["text"].as_str().unwrap_or_default().to_string(),
        };
        self.state.lock().unwrap().attempts.push(post.clone());

        if let Some(duration) = self.hang_for {
            tokio::time::sleep(duration).await;
        }
        if self.failing {
            return Err(TransportError::WebhookStatus { status: 500 });
        }
        self.state.lock().unwrap().delivered.push(post);
        Ok(())
    }
}
