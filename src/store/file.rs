//! JSON file backed state store.
//!
//! The whole record lives in one JSON object. Every write rewrites the file
//! through a temp file in the same directory followed by an atomic rename, so
//! a crash mid-write leaves the previous record intact.
//!
//! Several processes may share one state file (the daemon and a one-shot CLI
//! command). Nothing is cached between calls: each `get` re-reads the file
//! under a shared advisory lock, and each `set` holds an exclusive lock
//! across its whole read-modify-write. The lock lives on a sidecar
//! `<state file>.lock`, since the rename replaces the state file's inode.

use fs2::FileExt;
use serde_json::{Map, Value};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{StateStore, StoreResult};
use crate::error::StoreError;

#[derive(Debug)]
pub struct JsonFileStateStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_path = path.clone().into_os_string();
        lock_path.push(".lock");
        Self {
            path,
            lock_path: PathBuf::from(lock_path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn open_lock_file(&self) -> StoreResult<File> {
        let dir = self.dir();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(dir.display().to_string(), e))?;
        OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|e| StoreError::io(self.lock_path.display().to_string(), e))
    }

    /// Read the current record while holding a shared lock
    fn with_record_shared<T>(
        &self,
        operation: impl FnOnce(&Map<String, Value>) -> T,
    ) -> StoreResult<T> {
        let lock_file = self.open_lock_file()?;
        FileExt::lock_shared(&lock_file)
            .map_err(|e| StoreError::io(self.lock_path.display().to_string(), e))?;
        let record = self.load()?;
        let result = operation(&record);
        drop(lock_file);
        Ok(result)
    }

    /// Read, modify, and persist the record while holding an exclusive lock
    fn with_record_exclusive(
        &self,
        operation: impl FnOnce(&mut Map<String, Value>),
    ) -> StoreResult<()> {
        let lock_file = self.open_lock_file()?;
        FileExt::lock_exclusive(&lock_file)
            .map_err(|e| StoreError::io(self.lock_path.display().to_string(), e))?;
        let mut record = self.load()?;
        operation(&mut record);
        self.write_atomically(&record)?;
        drop(lock_file);
        Ok(())
    }

    fn load(&self) -> StoreResult<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let raw = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::io(self.path.display().to_string(), e))?;
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(map) => Ok(map),
            other => Err(StoreError::corrupt(
                self.path.display().to_string(),
                format!("expected a JSON object, found {other}"),
            )),
        }
    }

    fn write_atomically(&self, record: &Map<String, Value>) -> StoreResult<()> {
        let dir = self.dir();
        let bytes = serde_json::to_vec_pretty(record)?;
        let mut temp = tempfile::NamedTempFile::new_in(&dir)
            .map_err(|e| StoreError::io(dir.display().to_string(), e))?;
        temp.write_all(&bytes)
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| StoreError::io(temp.path().display().to_string(), e))?;
        temp.persist(&self.path)
            .map_err(|e| StoreError::io(self.path.display().to_string(), e.error))?;

        debug!(path = %self.path.display(), keys = record.len(), "State record written");
        Ok(())
    }
}

impl StateStore for JsonFileStateStore {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        self.with_record_shared(|record| record.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        self.with_record_exclusive(|record| {
            record.insert(key.to_string(), value);
        })
    }
}
