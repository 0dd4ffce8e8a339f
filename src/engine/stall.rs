use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::time::Duration;

/// Heartbeat guard: flags when the last successful check is too old.
///
/// Reported, never corrected; the monitor cannot repair its own scheduling.
/// A stall episode is keyed by the `last_check` it is stuck on, so each
/// episode is reported once and a fresh check starts the next one.
#[derive(Debug)]
pub struct StallDetector {
    threshold: Duration,
    reported_for: Mutex<Option<DateTime<Utc>>>,
}

impl StallDetector {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            reported_for: Mutex::new(None),
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Threshold rounded up to whole minutes, for alert text
    pub fn threshold_minutes(&self) -> u64 {
        self.threshold.as_secs().div_ceil(60)
    }

    /// Gap since `last_check` when it exceeds the threshold.
    ///
    /// `None` when no check was ever recorded or the gap is within bounds.
    /// A `last_check` in the future (clock skew) is never a stall.
    pub fn stalled_for(
        &self,
        now: DateTime<Utc>,
        last_check: Option<DateTime<Utc>>,
    ) -> Option<Duration> {
        let gap = (now - last_check?).to_std().ok()?;
        (gap > self.threshold).then_some(gap)
    }

    /// Claim the episode stuck on `last_check` for reporting.
    ///
    /// `false` when that episode was already reported.
    pub fn open_episode(&self, last_check: DateTime<Utc>) -> bool {
        let mut reported = self.reported_for.lock();
        if *reported == Some(last_check) {
            return false;
        }
        *reported = Some(last_check);
        true
    }
}
