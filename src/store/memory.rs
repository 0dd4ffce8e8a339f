use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

use super::{StateStore, StoreResult};

/// In-memory store for tests and one-shot runs
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }
}
