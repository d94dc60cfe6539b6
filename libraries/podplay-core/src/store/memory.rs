//! In-process key-value store
//!
//! Backs ephemeral sessions and doubles as the store used by tests. Reads and
//! writes can be made to fail on demand to exercise fail-open and
//! fail-closed paths of the repositories.

use crate::error::{StoreError, StoreResult};
use crate::traits::KeyValueStore;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory [`KeyValueStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    failing_write_keys: Mutex<HashSet<String>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with raw values
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        {
            let mut map = store.lock_values();
            for (k, v) in values {
                map.insert(k.into(), v.into());
            }
        }
        store
    }

    /// Make every `get` fail until reset
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every `set`/`remove` fail until reset
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make writes to a single key fail
    pub fn fail_writes_to(&self, key: &str) {
        self.lock_failing_keys().insert(key.to_string());
    }

    /// Clear all injected failures
    pub fn clear_failures(&self) {
        self.set_fail_reads(false);
        self.set_fail_writes(false);
        self.lock_failing_keys().clear();
    }

    /// Number of successful `set`/`remove` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Raw value of a key, bypassing failure injection
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock_values().get(key).cloned()
    }

    /// Keys currently present, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock_values().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn check_write(&self, key: &str) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) || self.lock_failing_keys().contains(key) {
            return Err(StoreError::unavailable(format!("write to {key} rejected")));
        }
        Ok(())
    }

    // A poisoned lock only means a test panicked mid-write; the map is still usable.
    fn lock_values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_failing_keys(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.failing_write_keys
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable(format!("read of {key} rejected")));
        }
        Ok(self.lock_values().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check_write(key)?;
        self.lock_values().insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        self.check_write(key)?;
        self.lock_values().remove(key);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
