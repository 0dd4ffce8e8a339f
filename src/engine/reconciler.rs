//! # Reconciliation Engine
//!
//! Compares the catalog's observed emptiness against the last persisted
//! health state and reacts to the difference.
//!
//! ## Overview
//!
//! One call to [`ReconciliationEngine::reconcile`] is one cycle: read the
//! previous state, probe the catalog, stamp `last_check`, classify, act on
//! the transition, then run the stall check. Transitions are evaluated in a
//! fixed precedence (desync, new failure, recovery, steady) and the first
//! match ends the cycle.
//!
//! ## Key Features
//!
//! - **Desync first**: a populated catalog with an empty listing is a stale
//!   cache, never an outage. It takes its own branch and logs a warning.
//! - **Immediate re-probe**: a new failure triggers a flush and exactly one
//!   extra probe, so a transient blip becomes one failure plus one recovery
//!   instead of two cycles of alerts.
//! - **Single cycle at a time**: `reconcile`, `run_recovery_check`, and
//!   `run_test_alert` share one async mutex. Readers do not take it.
//!
//! Probe, purge, and transport failures never escape a cycle. Only a state
//! store failure is returned to the caller.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::dashboard::DashboardSnapshot;
use super::stall::StallDetector;
use crate::alerts::{Alert, AlertDispatcher, AlertKind, DispatchReport};
use crate::clock::Clock;
use crate::config::Settings;
use crate::constants::{messages, DASHBOARD_RECENT_INCIDENTS};
use crate::error::Result;
use crate::incident_log::IncidentLog;
use crate::logging::{log_cycle_operation, log_error};
use crate::models::{CheckResult, IncidentKind, RemediationOutcome};
use crate::probe::CatalogProbe;
use crate::remediation::RemediationDispatcher;
use crate::state_machine::{classify, detect_transition, HealthState, Transition};
use crate::store::MonitorState;

/// Result of one reconciliation cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// `None` when the probe was unavailable and the cycle was skipped
    pub transition: Option<Transition>,
    /// Persisted state at the end of the cycle
    pub state: HealthState,
    /// The listing is still empty after a new failure; a follow-up check is due
    pub recovery_check_requested: bool,
    pub remediation: Option<RemediationOutcome>,
}

impl CycleReport {
    fn skipped(state: HealthState) -> Self {
        Self {
            transition: None,
            state,
            recovery_check_requested: false,
            remediation: None,
        }
    }

    fn completed(transition: Transition, state: HealthState) -> Self {
        Self {
            transition: Some(transition),
            state,
            recovery_check_requested: false,
            remediation: None,
        }
    }

    pub fn was_skipped(&self) -> bool {
        self.transition.is_none()
    }
}

/// Result of the manual test-alert action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestAlertReport {
    pub remediation: RemediationOutcome,
    pub dispatch: DispatchReport,
}

/// Drives reconciliation cycles against injected collaborators
pub struct ReconciliationEngine {
    pub(super) state: MonitorState,
    pub(super) incidents: IncidentLog,
    pub(super) probe: Arc<dyn CatalogProbe>,
    pub(super) remediation: RemediationDispatcher,
    pub(super) alerts: AlertDispatcher,
    pub(super) stall: StallDetector,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) settings: Settings,
    pub(super) site_url: String,
    pub(super) reprobe_delay: Duration,
    pub(super) cycle_guard: Mutex<()>,
}

impl std::fmt::Debug for ReconciliationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconciliationEngine")
            .field("remediation", &self.remediation)
            .field("alerts", &self.alerts)
            .field("stall", &self.stall)
            .field("settings", &self.settings)
            .field("site_url", &self.site_url)
            .field("reprobe_delay", &self.reprobe_delay)
            .finish_non_exhaustive()
    }
}

impl ReconciliationEngine {
    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub fn incidents(&self) -> &IncidentLog {
        &self.incidents
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run one reconciliation cycle
    pub async fn reconcile(&self) -> Result<CycleReport> {
        let _guard = self.cycle_guard.lock().await;

        let previous = self.state.status()?;
        let result = match self.probe.probe_emptiness().await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, previous = %previous, "Catalog probe unavailable; cycle skipped");
                log_cycle_operation("reconcile", previous.as_str(), "skipped", Some(&e.to_string()));
                return Ok(CycleReport::skipped(previous));
            }
        };

        let now = self.clock.now();
        self.state.set_last_check(now)?;

        let current = classify(&result);
        self.state.set_status(current)?;

        let transition = detect_transition(previous, &result);
        debug!(
            previous = %previous,
            current = %current,
            transition = transition.transition_type(),
            products_exist = result.products_exist,
            shop_query_empty = result.shop_query_empty,
            "Cycle classified"
        );

        let report = match transition {
            Transition::Desync => self.handle_desync(now).await?,
            Transition::NewFailure { .. } => self.handle_new_failure(now).await?,
            Transition::Recovery => self.handle_recovery().await?,
            Transition::Steady => CycleReport::completed(Transition::Steady, current),
        };

        self.check_stall().await;

        let transition_name = report
            .transition
            .map(|t| t.transition_type())
            .unwrap_or("skipped");
        log_cycle_operation("reconcile", report.state.as_str(), transition_name, None);
        Ok(report)
    }

    async fn handle_desync(&self, now: DateTime<Utc>) -> Result<CycleReport> {
        warn!("🛒 Listing empty while products exist; treating as cache desync");
        self.incidents
            .append(IncidentKind::Warning, messages::DESYNC_DETECTED)?;

        let outcome = self.remediation.flush().await;
        self.send(AlertKind::Desync).await;
        self.state.set_last_failure(now)?;

        Ok(CycleReport {
            remediation: Some(outcome),
            ..CycleReport::completed(Transition::Desync, HealthState::Empty)
        })
    }

    async fn handle_new_failure(&self, now: DateTime<Utc>) -> Result<CycleReport> {
        warn!("🛒 Listing went empty; starting auto-recovery");
        self.state.set_last_failure(now)?;
        self.incidents
            .append(IncidentKind::Failure, messages::FAILURE_DETECTED)?;

        let outcome = self.remediation.flush().await;
        self.send(AlertKind::Failure).await;

        if !self.reprobe_delay.is_zero() {
            tokio::time::sleep(self.reprobe_delay).await;
        }

        // Exactly one re-probe per failure transition
        if self.probe_is_healthy("reprobe").await {
            self.mark_immediate_recovery().await?;
            return Ok(CycleReport {
                remediation: Some(outcome),
                ..CycleReport::completed(
                    Transition::NewFailure {
                        recovered_immediately: true,
                    },
                    HealthState::Ok,
                )
            });
        }

        info!("Listing still empty after flush; follow-up recovery check requested");
        Ok(CycleReport {
            recovery_check_requested: true,
            remediation: Some(outcome),
            ..CycleReport::completed(
                Transition::NewFailure {
                    recovered_immediately: false,
                },
                HealthState::Empty,
            )
        })
    }

    async fn handle_recovery(&self) -> Result<CycleReport> {
        info!("✅ Listing populated again");
        self.incidents
            .append(IncidentKind::Recovery, messages::RECOVERED)?;
        self.send(AlertKind::Recovery).await;

        Ok(CycleReport::completed(Transition::Recovery, HealthState::Ok))
    }

    /// One-shot follow-up after a failure the re-probe did not clear.
    ///
    /// Acts only while the persisted state is still `Empty`; returns whether
    /// it recorded a recovery.
    pub async fn run_recovery_check(&self) -> Result<bool> {
        let _guard = self.cycle_guard.lock().await;

        let status = self.state.status()?;
        if status != HealthState::Empty {
            debug!(status = %status, "Recovery check not needed");
            return Ok(false);
        }

        if !self.probe_is_healthy("recovery_check").await {
            log_cycle_operation("recovery_check", status.as_str(), "still_empty", None);
            return Ok(false);
        }

        self.mark_immediate_recovery().await?;
        log_cycle_operation("recovery_check", HealthState::Ok.as_str(), "recovered", None);
        Ok(true)
    }

    /// Manual test: log, flush, and alert regardless of health
    pub async fn run_test_alert(&self) -> Result<TestAlertReport> {
        let _guard = self.cycle_guard.lock().await;

        self.incidents
            .append(IncidentKind::Test, messages::TEST_TRIGGERED)?;
        let remediation = self.remediation.flush().await;
        let dispatch = self.send(AlertKind::Test).await;

        let status = self.state.status()?;
        log_cycle_operation("test_alert", status.as_str(), "dispatched", None);
        Ok(TestAlertReport {
            remediation,
            dispatch,
        })
    }

    /// Heartbeat check; webhook only, never fails.
    ///
    /// Returns whether a stall alert was dispatched. One alert per stall
    /// episode; repeated heartbeats on the same stale check stay quiet.
    pub async fn check_stall(&self) -> bool {
        let last_check = match self.state.last_check() {
            Ok(last_check) => last_check,
            Err(e) => {
                log_error("stall_detector", "read_last_check", &e.to_string(), None);
                return false;
            }
        };

        let Some(gap) = self.stall.stalled_for(self.clock.now(), last_check) else {
            return false;
        };
        let Some(stuck_on) = last_check else {
            return false;
        };
        if !self.stall.open_episode(stuck_on) {
            debug!(gap_secs = gap.as_secs(), "Stall already reported for this episode");
            return false;
        }

        warn!(
            gap_secs = gap.as_secs(),
            threshold_secs = self.stall.threshold().as_secs(),
            "🚨 No reconciliation cycle within the stall threshold"
        );
        let alert = Alert::stall(self.stall.threshold_minutes());
        self.alerts
            .webhook_only(&alert, self.settings.webhook_url.as_deref())
            .await;
        true
    }

    /// Lock-free read of the operator view
    pub fn dashboard(&self) -> Result<DashboardSnapshot> {
        Ok(DashboardSnapshot {
            status: self.state.status()?,
            last_check: self.state.last_check()?,
            last_failure: self.state.last_failure()?,
            last_flush: self.state.last_flush()?,
            recent: self.incidents.recent(DASHBOARD_RECENT_INCIDENTS)?,
        })
    }

    async fn mark_immediate_recovery(&self) -> Result<()> {
        info!("✅ Listing visible again after cache flush");
        self.state.set_status(HealthState::Ok)?;
        self.incidents
            .append(IncidentKind::Recovery, messages::IMMEDIATE_RECOVERY)?;
        self.send(AlertKind::ImmediateRecovery).await;
        Ok(())
    }

    /// Probe once more; an unavailable catalog counts as not healthy
    async fn probe_is_healthy(&self, operation: &str) -> bool {
        match self.probe.probe_emptiness().await {
            Ok(result) => is_healthy(&result),
            Err(e) => {
                warn!(operation = operation, error = %e, "Catalog probe unavailable");
                false
            }
        }
    }

    async fn send(&self, kind: AlertKind) -> DispatchReport {
        let alert = Alert::compose(kind, &self.site_url);
        self.alerts
            .alert(&alert, self.settings.webhook_url.as_deref())
            .await
    }
}

fn is_healthy(result: &CheckResult) -> bool {
    classify(result) == HealthState::Ok
}
