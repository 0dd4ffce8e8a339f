use serde::{Deserialize, Serialize};

/// Backends that actually ran during one flush, in priority order.
///
/// Never empty once produced by the dispatcher: the fallback backend runs
/// whenever nothing else did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemediationOutcome {
    pub backends_invoked: Vec<String>,
}

impl RemediationOutcome {
    pub fn contains(&self, backend: &str) -> bool {
        self.backends_invoked.iter().any(|b| b == backend)
    }

    /// Comma separated names for log messages
    pub fn summary(&self) -> String {
        self.backends_invoked.join(", ")
    }
}
