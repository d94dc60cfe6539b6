//! Listening history
//!
//! Maintains a bounded history of played items, most recent first.
//! History is a convenience feature: read failures return an empty list and
//! write failures are logged and swallowed so they never interrupt playback.

use crate::error::Result;
use chrono::{DateTime, Utc};
use podplay_core::{keys, HistoryEntry, KeyValueStore, ListenItem};
use tracing::{debug, warn};

/// Default maximum number of entries kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// History backed by a [`KeyValueStore`]
pub struct HistoryRepository<S> {
    store: S,
    capacity: usize,
}

impl<S: KeyValueStore> HistoryRepository<S> {
    /// Create a repository with the default capacity (50)
    pub fn new(store: S) -> Self {
        Self::with_capacity(store, DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a repository keeping at most `capacity` entries (minimum 1)
    pub fn with_capacity(store: S, capacity: usize) -> Self {
        Self {
            store,
            capacity: capacity.max(1),
        }
    }

    /// Maximum number of entries kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record that `item` was just played
    ///
    /// Removes any previous entry for the same id, inserts the new one at the
    /// front and truncates to capacity. If the existing history cannot be read
    /// the write is skipped rather than overwriting it.
    pub async fn record_listen(&self, item: ListenItem) {
        let entries = match self.load().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(id = %item.id, error = %e, "Failed to read history, listen not recorded");
                return;
            }
        };

        let id = item.id.clone();
        let entries = apply_listen(entries, item, Utc::now(), self.capacity);

        match self.save(&entries).await {
            Ok(()) => debug!(id = %id, total = entries.len(), "Recorded listen"),
            Err(e) => warn!(id = %id, error = %e, "Failed to persist history"),
        }
    }

    /// History in persisted order (most recent first)
    pub async fn get_history(&self) -> Vec<HistoryEntry> {
        match self.load().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Failed to read history, returning empty list");
                Vec::new()
            }
        }
    }

    /// Remove every entry
    pub async fn clear_history(&self) {
        match self.store.remove(keys::history::ENTRIES).await {
            Ok(()) => debug!("Cleared history"),
            Err(e) => warn!(error = %e, "Failed to clear history"),
        }
    }

    async fn load(&self) -> Result<Vec<HistoryEntry>> {
        match self.store.get(keys::history::ENTRIES).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        let json = serde_json::to_string(entries)?;
        self.store.set(keys::history::ENTRIES, &json).await?;
        Ok(())
    }
}

/// De-duplicate, insert at the front, truncate
///
/// The new timestamp is clamped to be no earlier than the current front entry
/// so the list stays sorted by `listened_at` even if the clock steps back.
fn apply_listen(
    mut entries: Vec<HistoryEntry>,
    item: ListenItem,
    now: DateTime<Utc>,
    capacity: usize,
) -> Vec<HistoryEntry> {
    let listened_at = entries
        .first()
        .map_or(now, |front| front.listened_at.max(now));

    entries.retain(|e| e.item.id != item.id);
    entries.insert(0, HistoryEntry::new(item, listened_at));
    entries.truncate(capacity);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(secs)
    }

    fn ids(entries: &[HistoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.id().as_str()).collect()
    }

    #[test]
    fn inserts_at_front() {
        let entries = apply_listen(Vec::new(), ListenItem::new("a", "A"), at(0), 50);
        let entries = apply_listen(entries, ListenItem::new("b", "B"), at(1), 50);

        assert_eq!(ids(&entries), vec!["b", "a"]);
    }

    #[test]
    fn relisten_moves_to_front_with_new_timestamp() {
        let mut entries = Vec::new();
        for (i, id) in ["a", "b", "c"].iter().enumerate() {
            entries = apply_listen(entries, ListenItem::new(*id, *id), at(i as i64), 50);
        }

        let entries = apply_listen(entries, ListenItem::new("a", "A again"), at(10), 50);
        assert_eq!(ids(&entries), vec!["a", "c", "b"]);
        assert_eq!(entries[0].listened_at, at(10));
        assert_eq!(entries[0].item.title, "A again");
    }

    #[test]
    fn truncates_to_capacity() {
        let mut entries = Vec::new();
        for i in 0..5 {
            entries = apply_listen(entries, ListenItem::new(i.to_string(), "x"), at(i), 3);
        }

        assert_eq!(ids(&entries), vec!["4", "3", "2"]);
    }

    #[test]
    fn clock_going_backwards_keeps_order() {
        let entries = apply_listen(Vec::new(), ListenItem::new("a", "A"), at(100), 50);
        let entries = apply_listen(entries, ListenItem::new("b", "B"), at(50), 50);

        assert_eq!(ids(&entries), vec!["b", "a"]);
        assert!(entries[0].listened_at >= entries[1].listened_at);
    }
}
