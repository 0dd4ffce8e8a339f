use std::sync::Arc;
use tracing::{info, warn};

use super::CacheBackend;
use crate::clock::Clock;
use crate::incident_log::IncidentLog;
use crate::logging::log_error;
use crate::models::{IncidentKind, RemediationOutcome};
use crate::store::MonitorState;

/// Flushes every active cache backend, best effort.
///
/// `flush` never fails: backend errors drop that backend from the outcome,
/// and bookkeeping write failures are logged and ignored.
pub struct RemediationDispatcher {
    backends: Vec<Arc<dyn CacheBackend>>,
    fallback: Arc<dyn CacheBackend>,
    state: MonitorState,
    incidents: IncidentLog,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RemediationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.backends.iter().map(|b| b.name()).collect();
        f.debug_struct("RemediationDispatcher")
            .field("backends", &names)
            .field("fallback", &self.fallback.name())
            .finish_non_exhaustive()
    }
}

impl RemediationDispatcher {
    pub fn new(
        backends: Vec<Arc<dyn CacheBackend>>,
        fallback: Arc<dyn CacheBackend>,
        state: MonitorState,
        incidents: IncidentLog,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            backends,
            fallback,
            state,
            incidents,
            clock,
        }
    }

    /// Purge all active backends in priority order.
    pub async fn flush(&self) -> RemediationOutcome {
        let mut invoked = Vec::new();

        for backend in &self.backends {
            if !backend.is_active().await {
                continue;
            }
            match backend.purge().await {
                Ok(()) => {
                    info!(backend = %backend.name(), "🧹 Cache purged");
                    invoked.push(backend.name().to_string());
                }
                Err(e) => {
                    warn!(backend = %backend.name(), error = %e, "Cache purge failed; backend skipped");
                }
            }
        }

        if invoked.is_empty() {
            // The fallback counts as invoked even if its own purge errors
            if let Err(e) = self.fallback.purge().await {
                warn!(backend = %self.fallback.name(), error = %e, "Fallback cache purge failed");
            }
            invoked.push(self.fallback.name().to_string());
        }

        let outcome = RemediationOutcome {
            backends_invoked: invoked,
        };

        if let Err(e) = self.state.set_last_flush(self.clock.now()) {
            log_error("remediation", "record_last_flush", &e.to_string(), None);
        }
        if let Err(e) = self
            .incidents
            .append(IncidentKind::Info, format!("Cache flushed: {}", outcome.summary()))
        {
            log_error("remediation", "record_flush_incident", &e.to_string(), None);
        }

        outcome
    }
}
