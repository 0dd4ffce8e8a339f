use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;

use crate::models::IncidentRecord;
use crate::state_machine::HealthState;

/// Read-only view for operators
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    pub status: HealthState,
    pub last_check: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
    pub last_flush: Option<DateTime<Utc>>,
    pub recent: Vec<IncidentRecord>,
}

impl DashboardSnapshot {
    /// Plain-text rendering for the CLI
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Status:     {}", self.status);
        let _ = writeln!(out, "Last Check: {}", format_instant(self.last_check));
        let _ = writeln!(out, "Last Fail:  {}", format_instant(self.last_failure));
        let _ = writeln!(out, "Last Flush: {}", format_instant(self.last_flush));

        if !self.recent.is_empty() {
            let _ = writeln!(out, "---");
            for record in &self.recent {
                let _ = writeln!(out, "{record}");
            }
        }
        out
    }
}

fn format_instant(instant: Option<DateTime<Utc>>) -> String {
    instant
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "Never".to_string())
}
