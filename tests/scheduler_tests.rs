mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::watch;

use common::TestHarness;
use shop_health_monitor::models::{CheckResult, IncidentKind};
use shop_health_monitor::scheduler::{MonitorScheduler, SchedulerConfig};
use shop_health_monitor::state_machine::HealthState;

fn scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        check_interval: Duration::from_secs(60),
        recovery_check_delay: Duration::from_secs(10),
        heartbeat_interval: Duration::from_secs(30),
    }
}

#[tokio::test]
async fn test_registration_only_on_fresh_store() {
    let h = TestHarness::with_script(CheckResult::healthy(), vec![]);
    let scheduler = MonitorScheduler::new(h.engine.clone(), scheduler_config());

    assert!(scheduler.register().unwrap());
    let incidents = h.incidents();
    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0].kind, IncidentKind::Info);
    assert_eq!(incidents[0].message, "Scheduler registered.");

    h.engine.reconcile().await.unwrap();
    assert!(!scheduler.register().unwrap());
    assert_eq!(h.incidents().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cadence_runs_cycles_until_shutdown() {
    let h = TestHarness::with_script(CheckResult::healthy(), vec![]);
    let scheduler = MonitorScheduler::new(h.engine.clone(), scheduler_config());
    let (tx, rx) = watch::channel(false);

    let runner = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run(rx).await })
    };

    // ticks at 0s, 60s, 120s
    tokio::time::sleep(Duration::from_secs(150)).await;
    tx.send(true).unwrap();
    runner.await.unwrap();

    assert_eq!(scheduler.stats().cycles_completed.load(Ordering::Relaxed), 3);
    assert_eq!(h.probe.get_state().calls, 3);
    assert_eq!(h.engine.state().status().unwrap(), HealthState::Ok);
}

#[tokio::test(start_paused = true)]
async fn test_failed_cycle_schedules_one_recovery_check() {
    let h = TestHarness::with_script(CheckResult::empty(), vec![]);
    let scheduler = MonitorScheduler::new(h.engine.clone(), scheduler_config());

    let report = scheduler.run_cycle().await.unwrap();
    assert!(report.recovery_check_requested);
    assert!(scheduler.recovery_check_pending());

    // a second request while pending is ignored
    assert!(!scheduler.schedule_recovery_check());

    h.probe.set_default(CheckResult::healthy());
    tokio::time::sleep(Duration::from_secs(11)).await;

    assert!(!scheduler.recovery_check_pending());
    assert_eq!(scheduler.stats().recovery_checks.load(Ordering::Relaxed), 1);
    assert_eq!(h.engine.state().status().unwrap(), HealthState::Ok);
    assert_eq!(h.count_incidents(IncidentKind::Recovery), 1);
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_reports_stalled_checks() {
    let h = TestHarness::with_script(CheckResult::healthy(), vec![]);
    h.engine.reconcile().await.unwrap();
    // the last recorded check is far in the past
    h.clock.advance(chrono::Duration::minutes(30));

    let config = SchedulerConfig {
        check_interval: Duration::from_secs(3600),
        ..scheduler_config()
    };
    let scheduler = MonitorScheduler::new(h.engine.clone(), config);
    let (tx, rx) = watch::channel(false);

    // the cadence cycle finds the catalog unavailable, so last_check stays stale
    h.probe.push_unavailable();

    let runner = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run(rx).await })
    };

    tokio::time::sleep(Duration::from_secs(31)).await;
    tx.send(true).unwrap();
    runner.await.unwrap();

    assert_eq!(scheduler.stats().cycles_skipped.load(Ordering::Relaxed), 1);
    assert!(scheduler.stats().stall_alerts.load(Ordering::Relaxed) >= 1);
    assert!(h
        .webhook
        .delivered_texts()
        .iter()
        .all(|text| text.starts_with("🚨 Shop Monitor Stalled")));
    assert!(h.mailer.subjects().is_empty());
}
