//! Listening history types
use super::PodcastId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display fields of an item that just started playing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenItem {
    /// Podcast identity
    pub id: PodcastId,
    /// Display title
    pub title: String,
    /// Author or publisher
    #[serde(default)]
    pub author: Option<String>,
    /// Cover image URL
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Media URL
    #[serde(default)]
    pub audio_url: Option<String>,
    /// Length in seconds, when known
    #[serde(default)]
    pub duration_secs: Option<u64>,
}

impl ListenItem {
    /// Item with only an id and title
    pub fn new(id: impl Into<PodcastId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: None,
            thumbnail_url: None,
            audio_url: None,
            duration_secs: None,
        }
    }
}

/// A "listened" entry in the history list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// What was played
    #[serde(flatten)]
    pub item: ListenItem,
    /// When it started playing
    pub listened_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Entry for `item` played at `listened_at`
    pub fn new(item: ListenItem, listened_at: DateTime<Utc>) -> Self {
        Self { item, listened_at }
    }

    /// Identity used for de-duplication
    pub fn id(&self) -> &PodcastId {
        &self.item.id
    }
}
