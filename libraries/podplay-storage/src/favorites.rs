//! Favorites repository
//!
//! Favorites are persisted as a single JSON array of [`FavoriteDetail`]
//! records under [`keys::favorites::DETAILS`]. The favorite id set is derived
//! from that array, so ids and display records cannot drift apart.
//!
//! Older releases kept a second array of bare ids under
//! [`keys::favorites::LEGACY_IDS`] next to the details, and a partial write
//! could leave the two disagreeing. Whenever that legacy key is present the
//! repository reconciles on read: the id list wins, orphaned details are
//! dropped, missing details are rebuilt as placeholders, and the repaired
//! array replaces both keys.

use crate::error::{Result, StorageError};
use crate::guard::InFlight;
use chrono::{DateTime, Utc};
use podplay_core::{keys, FavoriteDetail, FavoriteItem, KeyValueStore, PodcastId};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Outcome of a reconciliation / id migration pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Numeric ids rewritten as strings
    pub coerced: usize,
    /// Placeholder details created for ids that had none
    pub rebuilt: usize,
    /// Records discarded (orphans, duplicates, undecodable)
    pub dropped: usize,
}

impl MigrationReport {
    /// Whether the pass changed anything
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Favorites backed by a [`KeyValueStore`]
pub struct FavoritesRepository<S> {
    store: S,
    in_flight: InFlight,
}

/// Raw persisted state before reconciliation
struct RawFavorites {
    details: Vec<Value>,
    legacy_ids: Option<Vec<Value>>,
}

impl<S: KeyValueStore> FavoritesRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            in_flight: InFlight::new(),
        }
    }

    /// Ids with a write currently running
    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    // ===== Reads (fail open) =====

    /// Whether `id` is a favorite; `false` if storage cannot be read
    pub async fn is_favorite(&self, id: &PodcastId) -> bool {
        match self.load().await {
            Ok(details) => details.iter().any(|d| &d.id == id),
            Err(e) => {
                warn!(id = %id, error = %e, "Failed to read favorites, reporting not favorite");
                false
            }
        }
    }

    /// Favorite ids in insertion order
    pub async fn get_favorite_ids(&self) -> Vec<PodcastId> {
        self.get_favorite_details()
            .await
            .into_iter()
            .map(|d| d.id)
            .collect()
    }

    /// Favorite records in insertion order
    ///
    /// Use [`podplay_core::types::sort_most_recent_first`] for a by-date view.
    pub async fn get_favorite_details(&self) -> Vec<FavoriteDetail> {
        match self.load().await {
            Ok(details) => details,
            Err(e) => {
                warn!(error = %e, "Failed to read favorites, returning empty list");
                Vec::new()
            }
        }
    }

    // ===== Writes (propagate) =====

    /// Mark a podcast as favorite
    ///
    /// Fails with [`StorageError::AlreadyFavorite`] if it already is, leaving
    /// state unchanged.
    pub async fn add_to_favorites(&self, item: &FavoriteItem) -> Result<()> {
        let _guard = self.in_flight.begin(&item.id)?;
        self.add_unguarded(item).await
    }

    /// Unmark a podcast; removing an absent id is a no-op
    pub async fn remove_from_favorites(&self, id: &PodcastId) -> Result<()> {
        let _guard = self.in_flight.begin(id)?;
        self.remove_unguarded(id).await.map(|_| ())
    }

    /// Flip the favorite state of a podcast
    ///
    /// Returns the resulting state (`true` = now a favorite).
    pub async fn toggle_favorite(&self, item: &FavoriteItem) -> Result<bool> {
        let _guard = self.in_flight.begin(&item.id)?;
        if self.remove_unguarded(&item.id).await? {
            Ok(false)
        } else {
            self.add_unguarded(item).await?;
            Ok(true)
        }
    }

    /// Remove every favorite
    pub async fn clear_all_favorites(&self) -> Result<()> {
        self.store.multi_remove(&keys::favorites::ALL).await?;
        info!("Cleared all favorites");
        Ok(())
    }

    /// Normalize persisted ids to strings and fold in the legacy id list
    ///
    /// Safe to call on every start: already-migrated data is left untouched
    /// and reported as a no-op.
    pub async fn migrate_favorite_ids(&self) -> Result<MigrationReport> {
        let raw = self.read_raw().await?;
        let had_legacy = raw.legacy_ids.is_some();
        let (details, report) = reconcile(raw, Utc::now());

        if had_legacy || !report.is_noop() {
            self.save(&details).await?;
            if had_legacy {
                self.store.remove(keys::favorites::LEGACY_IDS).await?;
            }
            info!(
                coerced = report.coerced,
                rebuilt = report.rebuilt,
                dropped = report.dropped,
                "Migrated favorite ids"
            );
        } else {
            debug!("Favorite ids already migrated");
        }

        Ok(report)
    }

    // ===== Internals =====

    async fn add_unguarded(&self, item: &FavoriteItem) -> Result<()> {
        let mut details = self.load_for_write().await?;
        if details.iter().any(|d| d.id == item.id) {
            return Err(StorageError::AlreadyFavorite(item.id.clone()));
        }

        details.push(FavoriteDetail::from_item(item, Utc::now()));
        self.save(&details).await?;
        debug!(id = %item.id, total = details.len(), "Added favorite");
        Ok(())
    }

    /// Returns whether anything was removed
    async fn remove_unguarded(&self, id: &PodcastId) -> Result<bool> {
        let mut details = self.load_for_write().await?;
        let before = details.len();
        details.retain(|d| &d.id != id);

        if details.len() == before {
            return Ok(false);
        }

        self.save(&details).await?;
        debug!(id = %id, total = details.len(), "Removed favorite");
        Ok(true)
    }

    /// Read the reconciled favorites, repairing legacy layouts on the way
    async fn load(&self) -> Result<Vec<FavoriteDetail>> {
        let raw = self.read_raw().await?;
        let had_legacy = raw.legacy_ids.is_some();
        let (details, report) = reconcile(raw, Utc::now());

        if had_legacy {
            // The repaired view is valid even if persisting it fails; the
            // legacy key stays and the repair simply runs again next read.
            match self.persist_repair(&details).await {
                Ok(()) => info!(
                    rebuilt = report.rebuilt,
                    dropped = report.dropped,
                    "Repaired legacy favorites on read"
                ),
                Err(e) => warn!(error = %e, "Failed to persist favorites repair"),
            }
        }

        Ok(details)
    }

    /// Like [`Self::load`], but the repair must land before anything is written
    ///
    /// A legacy id list left behind would override the next save on read.
    async fn load_for_write(&self) -> Result<Vec<FavoriteDetail>> {
        let raw = self.read_raw().await?;
        let had_legacy = raw.legacy_ids.is_some();
        let (details, report) = reconcile(raw, Utc::now());

        if had_legacy {
            self.persist_repair(&details).await?;
            info!(
                rebuilt = report.rebuilt,
                dropped = report.dropped,
                "Repaired legacy favorites before write"
            );
        }

        Ok(details)
    }

    async fn persist_repair(&self, details: &[FavoriteDetail]) -> Result<()> {
        self.save(details).await?;
        self.store.remove(keys::favorites::LEGACY_IDS).await?;
        Ok(())
    }

    async fn read_raw(&self) -> Result<RawFavorites> {
        let details = read_array(&self.store, keys::favorites::DETAILS)
            .await?
            .unwrap_or_default();
        let legacy_ids = read_array(&self.store, keys::favorites::LEGACY_IDS).await?;
        Ok(RawFavorites {
            details,
            legacy_ids,
        })
    }

    async fn save(&self, details: &[FavoriteDetail]) -> Result<()> {
        let json = serde_json::to_string(details)?;
        self.store.set(keys::favorites::DETAILS, &json).await?;
        Ok(())
    }
}

async fn read_array<S: KeyValueStore>(store: &S, key: &str) -> Result<Option<Vec<Value>>> {
    let Some(json) = store.get(key).await? else {
        return Ok(None);
    };

    match serde_json::from_str::<Value>(&json)? {
        Value::Array(values) => Ok(Some(values)),
        Value::Null => Ok(None),
        other => Err(StorageError::Persistence(format!(
            "{key} is not a JSON array: {other}"
        ))),
    }
}

/// Reconcile persisted favorites into a consistent list
///
/// Numeric ids are coerced, duplicate ids keep their first record, and if a
/// legacy id list exists it is authoritative for membership and order.
fn reconcile(raw: RawFavorites, now: DateTime<Utc>) -> (Vec<FavoriteDetail>, MigrationReport) {
    let mut report = MigrationReport::default();

    let mut seen = HashSet::new();
    let mut details = Vec::with_capacity(raw.details.len());
    for value in raw.details {
        match decode_detail(value) {
            Some((detail, coerced)) => {
                if coerced {
                    report.coerced += 1;
                }
                if seen.insert(detail.id.clone()) {
                    details.push(detail);
                } else {
                    report.dropped += 1;
                }
            }
            None => report.dropped += 1,
        }
    }

    let Some(legacy_ids) = raw.legacy_ids else {
        return (details, report);
    };

    let mut ids = Vec::with_capacity(legacy_ids.len());
    let mut seen_ids = HashSet::new();
    for value in &legacy_ids {
        if let Some((id, coerced)) = PodcastId::from_legacy_value(value) {
            if coerced {
                report.coerced += 1;
            }
            if seen_ids.insert(id.clone()) {
                ids.push(id);
            }
        }
    }

    let mut by_id: HashMap<PodcastId, FavoriteDetail> =
        details.into_iter().map(|d| (d.id.clone(), d)).collect();

    let repaired: Vec<FavoriteDetail> = ids
        .into_iter()
        .map(|id| {
            by_id.remove(&id).unwrap_or_else(|| {
                report.rebuilt += 1;
                FavoriteDetail::placeholder(id, now)
            })
        })
        .collect();

    report.dropped += by_id.len();
    (repaired, report)
}

/// Decode one persisted detail, coercing a legacy numeric id
fn decode_detail(mut value: Value) -> Option<(FavoriteDetail, bool)> {
    let (id, coerced) = PodcastId::from_legacy_value(value.get("id")?)?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("id".to_string(), Value::String(id.as_str().to_string()));
    }

    match serde_json::from_value::<FavoriteDetail>(value) {
        Ok(detail) => Some((detail, coerced)),
        Err(e) => {
            warn!(id = %id, error = %e, "Dropping undecodable favorite record");
            None
        }
    }
}
