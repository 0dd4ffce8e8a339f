//! # Admin Web State
//!
//! Shared handler state. Actions go through the scheduler so a manual check
//! schedules the same follow-up recovery check a timed one would.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::engine::ReconciliationEngine;
use crate::scheduler::MonitorScheduler;

#[derive(Debug, Clone)]
pub struct AppState {
    pub scheduler: MonitorScheduler,
    pub environment: String,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(scheduler: MonitorScheduler, environment: impl Into<String>) -> Self {
        Self {
            scheduler,
            environment: environment.into(),
            started_at: Utc::now(),
        }
    }

    pub fn engine(&self) -> &Arc<ReconciliationEngine> {
        self.scheduler.engine()
    }
}
