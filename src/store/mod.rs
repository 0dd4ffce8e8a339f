//! # State Store
//!
//! Persisted record shared by the engine, the incident log, and the
//! dashboard. The engine writes it key by key; within a process the engine's
//! cycle guard orders cycles, and the file store additionally locks each
//! access so other processes sharing the file never lose a write.

pub mod file;
pub mod memory;
pub mod monitor_state;

use serde_json::Value;

use crate::error::StoreError;

pub use file::JsonFileStateStore;
pub use memory::MemoryStateStore;
pub use monitor_state::MonitorState;

pub type StoreResult<T> = Result<T, StoreError>;

/// Key/value persistence for monitor state
pub trait StateStore: Send + Sync {
    /// Read a value; `None` when the key was never written
    fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Overwrite a value
    fn set(&self, key: &str, value: Value) -> StoreResult<()>;
}
