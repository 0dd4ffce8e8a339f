use serde::{Deserialize, Serialize};
use std::fmt;

/// Storefront health state as persisted between cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    /// No cycle has completed yet
    #[default]
    Unknown,
    /// Listing shows at least one item
    Ok,
    /// Listing or backing store is empty
    Empty,
}

impl HealthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Ok => "ok",
            Self::Empty => "empty",
        }
    }

    /// Check if this state counts as an outage
    pub fn is_failing(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Check if at least one cycle has produced a verdict
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HealthState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(Self::Unknown),
            "ok" => Ok(Self::Ok),
            "empty" => Ok(Self::Empty),
            _ => Err(format!("Invalid health state: {s}")),
        }
    }
}
