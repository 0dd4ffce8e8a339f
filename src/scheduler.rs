//! # Monitor Scheduler
//!
//! Timer-driven entry point for the engine. Three independent concerns run on
//! tokio:
//!
//! - the cadence tick, one reconciliation cycle per `check_interval_minutes`
//! - a one-shot delayed recovery check after a failure the re-probe did not
//!   clear, spawned at most once while pending
//! - a heartbeat tick calling [`ReconciliationEngine::check_stall`] on its own
//!   task, so a hung cycle or a stuck cadence still gets reported
//!
//! Cadence ticks that fall behind are skipped rather than bunched up; cycles
//! never overlap because the engine serialises them.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::MonitorConfig;
use crate::constants::messages;
use crate::engine::{CycleReport, ReconciliationEngine};
use crate::error::Result;
use crate::logging::log_error;
use crate::models::IncidentKind;

/// Timer settings for the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub check_interval: Duration,
    pub recovery_check_delay: Duration,
    pub heartbeat_interval: Duration,
}

impl SchedulerConfig {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            check_interval: config.check_interval(),
            recovery_check_delay: config.recovery_check_delay(),
            heartbeat_interval: config.heartbeat_interval(),
        }
    }
}

/// Runtime counters
#[derive(Debug, Default)]
pub struct SchedulerStats {
    pub cycles_completed: AtomicU64,
    pub cycles_skipped: AtomicU64,
    pub cycle_errors: AtomicU64,
    pub recovery_checks: AtomicU64,
    pub heartbeats: AtomicU64,
    pub stall_alerts: AtomicU64,
}

/// Drives the engine on timers until shut down
#[derive(Clone)]
pub struct MonitorScheduler {
    engine: Arc<ReconciliationEngine>,
    config: SchedulerConfig,
    recovery_pending: Arc<AtomicBool>,
    stats: Arc<SchedulerStats>,
}

impl std::fmt::Debug for MonitorScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorScheduler")
            .field("config", &self.config)
            .field(
                "recovery_pending",
                &self.recovery_pending.load(Ordering::Relaxed),
            )
            .field("stats", &self.stats)
            .finish()
    }
}

impl MonitorScheduler {
    pub fn new(engine: Arc<ReconciliationEngine>, config: SchedulerConfig) -> Self {
        Self {
            engine,
            config,
            recovery_pending: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(SchedulerStats::default()),
        }
    }

    pub fn engine(&self) -> &Arc<ReconciliationEngine> {
        &self.engine
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    pub fn recovery_check_pending(&self) -> bool {
        self.recovery_pending.load(Ordering::SeqCst)
    }

    /// Log the registration incident on a store that never saw a check.
    ///
    /// Returns whether the incident was written.
    pub fn register(&self) -> Result<bool> {
        if self.engine.state().last_check()?.is_some() {
            return Ok(false);
        }
        self.engine
            .incidents()
            .append(IncidentKind::Info, messages::SCHEDULER_REGISTERED)?;
        Ok(true)
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        if let Err(e) = self.register() {
            log_error("scheduler", "register", &e.to_string(), None);
        }

        info!(
            check_interval_secs = self.config.check_interval.as_secs(),
            heartbeat_interval_secs = self.config.heartbeat_interval.as_secs(),
            "⏱️ Monitor scheduler started"
        );

        let heartbeat = tokio::spawn(self.clone().heartbeat_loop(shutdown.clone()));

        let mut cadence = interval(self.config.check_interval);
        cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cadence.tick() => {
                    self.run_cycle().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        heartbeat.abort();
        info!("Monitor scheduler stopped");
    }

    /// One cycle, scheduling the follow-up recovery check when asked for.
    ///
    /// Store errors are logged; the next tick tries again.
    pub async fn run_cycle(&self) -> Option<CycleReport> {
        match self.engine.reconcile().await {
            Ok(report) => {
                if report.was_skipped() {
                    self.stats.cycles_skipped.fetch_add(1, Ordering::Relaxed);
                } else {
                    self.stats.cycles_completed.fetch_add(1, Ordering::Relaxed);
                }
                if report.recovery_check_requested {
                    self.schedule_recovery_check();
                }
                Some(report)
            }
            Err(e) => {
                self.stats.cycle_errors.fetch_add(1, Ordering::Relaxed);
                log_error("scheduler", "reconcile", &e.to_string(), None);
                None
            }
        }
    }

    /// Spawn the delayed recovery check unless one is already pending
    pub fn schedule_recovery_check(&self) -> bool {
        if self
            .recovery_pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Recovery check already pending");
            return false;
        }

        let scheduler = self.clone();
        let delay = self.config.recovery_check_delay;
        debug!(delay_secs = delay.as_secs(), "Recovery check scheduled");

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            scheduler.stats.recovery_checks.fetch_add(1, Ordering::Relaxed);
            if let Err(e) = scheduler.engine.run_recovery_check().await {
                log_error("scheduler", "recovery_check", &e.to_string(), None);
            }
            scheduler.recovery_pending.store(false, Ordering::SeqCst);
        });
        true
    }

    async fn heartbeat_loop(self, mut shutdown: watch::Receiver<bool>) {
        let period = self.config.heartbeat_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.stats.heartbeats.fetch_add(1, Ordering::Relaxed);
                    if self.engine.check_stall().await {
                        self.stats.stall_alerts.fetch_add(1, Ordering::Relaxed);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }
}
