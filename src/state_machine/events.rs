use serde::{Deserialize, Serialize};

/// Transition observed by a single reconciliation cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transition {
    /// Backing store has items but the listing query shows none
    Desync,
    /// Previously healthy (or unknown) listing went empty
    NewFailure {
        /// The in-cycle re-probe saw the listing come back
        recovered_immediately: bool,
    },
    /// Previously empty listing is populated again
    Recovery,
    /// Nothing changed worth reacting to
    Steady,
}

impl Transition {
    /// Get a string representation of the transition for logging
    pub fn transition_type(&self) -> &'static str {
        match self {
            Self::Desync => "desync",
            Self::NewFailure { .. } => "new_failure",
            Self::Recovery => "recovery",
            Self::Steady => "steady",
        }
    }

    /// Check if this transition triggers cache remediation
    pub fn requires_remediation(&self) -> bool {
        matches!(self, Self::Desync | Self::NewFailure { .. })
    }

    /// Check if this transition sends at least one alert
    pub fn is_alerting(&self) -> bool {
        !matches!(self, Self::Steady)
    }
}
