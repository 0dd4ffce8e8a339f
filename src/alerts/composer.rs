use serde::Serialize;
use std::fmt;

/// Every alert the monitor can send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Failure,
    Desync,
    Recovery,
    ImmediateRecovery,
    Stall,
    Test,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failure => write!(f, "failure"),
            Self::Desync => write!(f, "desync"),
            Self::Recovery => write!(f, "recovery"),
            Self::ImmediateRecovery => write!(f, "immediate_recovery"),
            Self::Stall => write!(f, "stall"),
            Self::Test => write!(f, "test"),
        }
    }
}

/// A composed subject/body pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub subject: String,
    pub body: String,
}

impl Alert {
    pub fn new(kind: AlertKind, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Build the canonical alert for `kind`. `site_url` is appended to the
    /// failure and desync bodies when non-empty.
    pub fn compose(kind: AlertKind, site_url: &str) -> Self {
        match kind {
            AlertKind::Failure => Self::new(
                kind,
                "⚠ Shop Products Missing",
                with_site("Zero products detected.\nAuto-recovery started.", site_url),
            ),
            AlertKind::Desync => Self::new(
                kind,
                "⚠ Shop Cache Desync",
                with_site("Shop page empty while products exist.\nCache flushed.", site_url),
            ),
            AlertKind::Recovery => {
                Self::new(kind, "✅ Shop Recovered", "Products are visible again.")
            }
            AlertKind::ImmediateRecovery => Self::new(
                kind,
                "✅ Immediate Recovery",
                "Products visible again after cache purge.",
            ),
            AlertKind::Stall => Self::new(
                kind,
                "🚨 Shop Monitor Stalled",
                "No checks in last 5 minutes.",
            ),
            AlertKind::Test => Self::new(kind, "[TEST] Shop Monitor", "This is a test alert."),
        }
    }

    /// Stall alert naming the actual threshold
    pub fn stall(threshold_minutes: u64) -> Self {
        Self::new(
            AlertKind::Stall,
            "🚨 Shop Monitor Stalled",
            format!("No checks in last {threshold_minutes} minutes."),
        )
    }

    /// Single text field for chat webhooks: subject, blank line, body
    pub fn webhook_text(&self) -> String {
        format!("{}\n\n{}", self.subject, self.body)
    }
}

fn with_site(body: &str, site_url: &str) -> String {
    if site_url.is_empty() {
        body.to_string()
    } else {
        format!("{body}\n{site_url}")
    }
}
