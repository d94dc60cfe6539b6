//! Per-id in-flight write tracking
//!
//! Rapid taps on a favorite button must not interleave two read-modify-write
//! cycles on the same id. A write holds an [`InFlightGuard`] for its id; a
//! second write for that id fails fast until the guard is dropped.

use crate::error::{Result, StorageError};
use podplay_core::PodcastId;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Set of ids with a write in progress
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    ids: Arc<Mutex<HashSet<PodcastId>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` as in flight, or fail if it already is
    pub fn begin(&self, id: &PodcastId) -> Result<InFlightGuard> {
        let mut ids = self.ids.lock().unwrap_or_else(|e| e.into_inner());
        if !ids.insert(id.clone()) {
            return Err(StorageError::WriteInFlight(id.clone()));
        }
        Ok(InFlightGuard {
            ids: Arc::clone(&self.ids),
            id: id.clone(),
        })
    }

    /// Whether a write for `id` is currently running
    pub fn is_in_flight(&self, id: &PodcastId) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(id)
    }
}

/// Releases the id when dropped
#[derive(Debug)]
pub struct InFlightGuard {
    ids: Arc<Mutex<HashSet<PodcastId>>>,
    id: PodcastId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.ids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.id);
    }
}
