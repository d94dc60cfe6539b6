//! Favorite types
use super::PodcastId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A podcast the user wants to mark as favorite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteItem {
    /// Podcast identity
    pub id: PodcastId,
    /// Display title
    pub title: String,
    /// Cover image URL
    pub thumbnail_url: String,
}

impl FavoriteItem {
    /// Create an item from its display fields
    pub fn new(
        id: impl Into<PodcastId>,
        title: impl Into<String>,
        thumbnail_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            thumbnail_url: thumbnail_url.into(),
        }
    }
}

/// Denormalized display record of a favorite podcast
///
/// Persisted as camelCase JSON, the layout the mobile app has always written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteDetail {
    /// Podcast identity, unique within the collection
    pub id: PodcastId,
    /// Display title, empty for rebuilt placeholders
    #[serde(default)]
    pub title: String,
    /// Cover image URL, empty for rebuilt placeholders
    #[serde(default)]
    pub thumbnail_url: String,
    /// When the podcast was marked favorite
    // Records from the oldest releases carry no timestamp
    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,
}

impl FavoriteDetail {
    /// Create a detail record for a freshly added favorite
    pub fn from_item(item: &FavoriteItem, added_at: DateTime<Utc>) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            thumbnail_url: item.thumbnail_url.clone(),
            added_at,
        }
    }

    /// Placeholder rebuilt for an id that lost its display record
    pub fn placeholder(id: PodcastId, added_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: String::new(),
            thumbnail_url: String::new(),
            added_at,
        }
    }
}

/// Sort favorites for a "most recent first" display
///
/// The repository keeps insertion order; ordering by date is presentation.
pub fn sort_most_recent_first(details: &mut [FavoriteDetail]) {
    details.sort_by(|a, b| b.added_at.cmp(&a.added_at));
}
