//! # System Constants
//!
//! Fixed operational boundaries of the monitor. Tunables that operators are
//! expected to change live in [`crate::config`]; these do not.

use std::time::Duration;

/// Maximum number of incident records retained
pub const INCIDENT_LOG_CAPACITY: usize = 20;

/// Number of incidents shown on the dashboard
pub const DASHBOARD_RECENT_INCIDENTS: usize = 3;

/// Gap since the last check after which a heartbeat alert fires
pub const DEFAULT_STALL_THRESHOLD: Duration = Duration::from_secs(300);

/// Upper bound on a single webhook call
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Delay before the one-shot follow-up recovery check
pub const DEFAULT_RECOVERY_CHECK_DELAY: Duration = Duration::from_secs(10);

/// Pause before re-probing a fresh failure, so purged caches can settle
pub const DEFAULT_REPROBE_DELAY: Duration = Duration::from_secs(2);

/// Upper bound on handing one message to the local mailer
pub const DEFAULT_MAIL_TIMEOUT: Duration = Duration::from_secs(30);

/// Name recorded for the universal fallback backend
pub const OBJECT_CACHE_BACKEND: &str = "Object Cache";

/// Keys of the persisted state record
pub mod state_keys {
    pub const STATUS: &str = "status";
    pub const LAST_CHECK: &str = "last_check";
    pub const LAST_FAILURE: &str = "last_failure";
    pub const LAST_FLUSH: &str = "last_flush";
    pub const INCIDENT_LOG: &str = "incident_log";
}

/// Fixed incident messages
pub mod messages {
    pub const DESYNC_DETECTED: &str = "Shop empty but products exist. Cache desync detected.";
    pub const FAILURE_DETECTED: &str = "Zero products detected. Auto-recovery started.";
    pub const RECOVERED: &str = "Shop recovered.";
    pub const IMMEDIATE_RECOVERY: &str = "Immediate recovery after cache flush.";
    pub const TEST_TRIGGERED: &str = "Manual test alert triggered.";
    pub const SCHEDULER_REGISTERED: &str = "Scheduler registered.";
}
