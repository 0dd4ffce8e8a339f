//! # Incident Log
//!
//! Newest-first, capacity-bounded history of incidents kept in the state
//! store. Insertion happens only at the front and the tail is truncated on
//! every insert, so the log never exceeds [`INCIDENT_LOG_CAPACITY`] entries
//! and is ordered by insertion.

use std::sync::Arc;
use tracing::debug;

use crate::clock::Clock;
use crate::constants::INCIDENT_LOG_CAPACITY;
use crate::models::{IncidentKind, IncidentRecord};
use crate::store::{MonitorState, StoreResult};

#[derive(Clone)]
pub struct IncidentLog {
    state: MonitorState,
    clock: Arc<dyn Clock>,
    capacity: usize,
}

impl std::fmt::Debug for IncidentLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncidentLog")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl IncidentLog {
    pub fn new(state: MonitorState, clock: Arc<dyn Clock>) -> Self {
        Self {
            state,
            clock,
            capacity: INCIDENT_LOG_CAPACITY,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record an incident at the front of the log, evicting the oldest entry
    /// once the capacity is exceeded.
    pub fn append(&self, kind: IncidentKind, message: impl Into<String>) -> StoreResult<IncidentRecord> {
        let record = IncidentRecord::new(self.clock.now(), kind, message);

        let mut records = self.state.incidents()?;
        records.insert(0, record.clone());
        records.truncate(self.capacity);
        self.state.set_incidents(&records)?;

        debug!(
            kind = %record.kind,
            message = %record.message,
            retained = records.len(),
            "Incident recorded"
        );
        Ok(record)
    }

    /// Up to `n` newest incidents, newest first. `n` is clamped to the capacity.
    pub fn recent(&self, n: usize) -> StoreResult<Vec<IncidentRecord>> {
        let mut records = self.state.incidents()?;
        records.truncate(n.min(self.capacity));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStateStore;
    use chrono::{Duration, Utc};

    fn log() -> (Arc<ManualClock>, IncidentLog) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let state = MonitorState::new(Arc::new(MemoryStateStore::new()));
        (clock.clone(), IncidentLog::new(state, clock))
    }

    #[test]
    fn test_append_inserts_at_front() {
        let (clock, log) = log();
        log.append(IncidentKind::Failure, "first").unwrap();
        clock.advance(Duration::seconds(1));
        log.append(IncidentKind::Recovery, "second").unwrap();

        let recent = log.recent(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].message, "second");
        assert_eq!(recent[1].message, "first");
        assert!(recent[0].time >= recent[1].time);
    }

    #[test]
    fn test_append_evicts_oldest_beyond_capacity() {
        let (clock, log) = log();
        for i in 0..(INCIDENT_LOG_CAPACITY + 5) {
            log.append(IncidentKind::Info, format!("entry {i}")).unwrap();
            clock.advance(Duration::seconds(1));
        }

        let all = log.recent(usize::MAX).unwrap();
        assert_eq!(all.len(), INCIDENT_LOG_CAPACITY);
        assert_eq!(all[0].message, format!("entry {}", INCIDENT_LOG_CAPACITY + 4));
        assert_eq!(all[INCIDENT_LOG_CAPACITY - 1].message, "entry 5");
    }

    #[test]
    fn test_recent_does_not_mutate() {
        let (_, log) = log();
        for kind in [IncidentKind::Info, IncidentKind::Warning, IncidentKind::Test] {
            log.append(kind, "x").unwrap();
        }

        assert_eq!(log.recent(2).unwrap().len(), 2);
        assert_eq!(log.recent(10).unwrap().len(), 3);
        assert_eq!(log.recent(0).unwrap().len(), 0);
    }
}
