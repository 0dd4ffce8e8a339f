use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a logged incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentKind {
    Info,
    Warning,
    Failure,
    Recovery,
    Test,
}

impl fmt::Display for IncidentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Failure => write!(f, "failure"),
            Self::Recovery => write!(f, "recovery"),
            Self::Test => write!(f, "test"),
        }
    }
}

/// A single immutable incident log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentRecord {
    pub time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: IncidentKind,
    pub message: String,
}

impl IncidentRecord {
    pub fn new(time: DateTime<Utc>, kind: IncidentKind, message: impl Into<String>) -> Self {
        Self {
            time,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for IncidentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.time.format("%Y-%m-%d %H:%M:%S"),
            self.kind,
            self.message
        )
    }
}
