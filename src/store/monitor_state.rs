//! Typed access to the persisted monitor record.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use super::{StateStore, StoreResult};
use crate::constants::state_keys;
use crate::error::StoreError;
use crate::models::IncidentRecord;
use crate::state_machine::HealthState;

#[derive(Clone)]
pub struct MonitorState {
    store: Arc<dyn StateStore>,
}

impl std::fmt::Debug for MonitorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorState").finish_non_exhaustive()
    }
}

impl MonitorState {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.store.get(key)? {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| StoreError::corrupt(key, e.to_string())),
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        self.store.set(key, serde_json::to_value(value)?)
    }

    /// Current health state, `Unknown` if never written
    pub fn status(&self) -> StoreResult<HealthState> {
        Ok(self.read(state_keys::STATUS)?.unwrap_or_default())
    }

    pub fn set_status(&self, state: HealthState) -> StoreResult<()> {
        self.write(state_keys::STATUS, &state)
    }

    pub fn last_check(&self) -> StoreResult<Option<DateTime<Utc>>> {
        self.read(state_keys::LAST_CHECK)
    }

    pub fn set_last_check(&self, at: DateTime<Utc>) -> StoreResult<()> {
        self.write(state_keys::LAST_CHECK, &at)
    }

    pub fn last_failure(&self) -> StoreResult<Option<DateTime<Utc>>> {
        self.read(state_keys::LAST_FAILURE)
    }

    pub fn set_last_failure(&self, at: DateTime<Utc>) -> StoreResult<()> {
        self.write(state_keys::LAST_FAILURE, &at)
    }

    pub fn last_flush(&self) -> StoreResult<Option<DateTime<Utc>>> {
        self.read(state_keys::LAST_FLUSH)
    }

    pub fn set_last_flush(&self, at: DateTime<Utc>) -> StoreResult<()> {
        self.write(state_keys::LAST_FLUSH, &at)
    }

    pub(crate) fn incidents(&self) -> StoreResult<Vec<IncidentRecord>> {
        Ok(self.read(state_keys::INCIDENT_LOG)?.unwrap_or_default())
    }

    pub(crate) fn set_incidents(&self, records: &[IncidentRecord]) -> StoreResult<()> {
        self.write(state_keys::INCIDENT_LOG, &records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStateStore;
    use serde_json::json;

    fn state() -> (Arc<MemoryStateStore>, MonitorState) {
        let store = Arc::new(MemoryStateStore::new());
        (store.clone(), MonitorState::new(store))
    }

    #[test]
    fn test_defaults_when_never_written() {
        let (_, state) = state();
        assert_eq!(state.status().unwrap(), HealthState::Unknown);
        assert!(state.last_check().unwrap().is_none());
        assert!(state.last_failure().unwrap().is_none());
        assert!(state.last_flush().unwrap().is_none());
        assert!(state.incidents().unwrap().is_empty());
    }

    #[test]
    fn test_timestamps_overwrite() {
        let (_, state) = state();
        let first = Utc::now();
        let second = first + chrono::Duration::minutes(1);
        state.set_last_failure(first).unwrap();
        state.set_last_failure(second).unwrap();
        assert_eq!(state.last_failure().unwrap(), Some(second));
    }

    #[test]
    fn test_corrupt_status_is_reported() {
        let (store, state) = state();
        store.set(state_keys::STATUS, json!("sideways")).unwrap();
        assert!(matches!(state.status(), Err(StoreError::Corrupt { .. })));
    }
}
