//! Types for the podcast API.
//!
//! The backend has shipped several response shapes over time, so every model
//! accepts both `snake_case` and `camelCase` field names and list endpoints
//! accept wrapped or bare arrays.

use crate::auth::AuthHeaderStyle;
use chrono::{DateTime, Utc};
use podplay_core::config::ApiSettings;
use podplay_core::{FavoriteItem, ListenItem, PodcastId};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API base URL (e.g., "https://api.example.com/api")
    pub base_url: String,
    /// Whole-request timeout
    pub timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// How the token is attached to requests
    pub auth_header: AuthHeaderStyle,
}

impl ApiConfig {
    /// Create a new config with default timeouts and bearer auth.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            auth_header: AuthHeaderStyle::Bearer,
        }
    }

    /// Use a custom auth header style.
    #[must_use]
    pub fn with_auth_header(mut self, auth_header: AuthHeaderStyle) -> Self {
        self.auth_header = auth_header;
        self
    }

    /// Build from the `[api]` section of the application config.
    pub fn from_settings(settings: &ApiSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
            connect_timeout: Duration::from_secs(settings.connect_timeout_secs),
            auth_header: AuthHeaderStyle::parse(&settings.auth_header),
        }
    }
}

/// A podcast episode as served by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Podcast {
    pub id: PodcastId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, alias = "thumbnail_url", alias = "image", alias = "imageUrl")]
    pub thumbnail_url: Option<String>,
    #[serde(default, alias = "audio_url", alias = "audio")]
    pub audio_url: Option<String>,
    #[serde(default, alias = "duration_secs")]
    pub duration_secs: Option<u64>,
    #[serde(
        default,
        alias = "category_id",
        deserialize_with = "optional_flexible_id"
    )]
    pub category_id: Option<String>,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Podcast {
    /// Favorite record for this podcast.
    pub fn to_favorite_item(&self) -> FavoriteItem {
        FavoriteItem {
            id: self.id.clone(),
            title: self.title.clone(),
            thumbnail_url: self.thumbnail_url.clone().unwrap_or_default(),
        }
    }

    /// History record for this podcast.
    pub fn to_listen_item(&self) -> ListenItem {
        ListenItem {
            id: self.id.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
            thumbnail_url: self.thumbnail_url.clone(),
            audio_url: self.audio_url.clone(),
            duration_secs: self.duration_secs,
        }
    }
}

/// Podcast category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "avatar_url", alias = "avatar")]
    pub avatar_url: Option<String>,
}

/// Partial profile update; unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Login request.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "accessToken", alias = "access_token")]
    pub token: String,
    pub user: UserProfile,
}

/// Pagination info returned by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default, alias = "total_pages")]
    pub total_pages: u32,
}

fn default_page() -> u32 {
    1
}

impl Pagination {
    /// Pagination for a response that carried none: everything is on this page.
    pub fn single_page(page: u32, limit: u32, count: usize) -> Self {
        Self {
            page,
            limit,
            total: count as u64,
            total_pages: u32::from(count > 0),
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn empty(page: u32, limit: u32) -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::single_page(page, limit, 0),
        }
    }
}

/// List response in any of the shapes the API produces.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListEnvelope<T> {
    Wrapped {
        data: Vec<T>,
        #[serde(default)]
        pagination: Option<Pagination>,
    },
    Bare(Vec<T>),
}

impl<T> ListEnvelope<T> {
    pub(crate) fn into_page(self, page: u32, limit: u32) -> Page<T> {
        let (items, pagination) = match self {
            Self::Wrapped { data, pagination } => (data, pagination),
            Self::Bare(items) => (items, None),
        };
        let pagination =
            pagination.unwrap_or_else(|| Pagination::single_page(page, limit, items.len()));
        Page { items, pagination }
    }

    pub(crate) fn into_items(self) -> Vec<T> {
        match self {
            Self::Wrapped { data, .. } => data,
            Self::Bare(items) => items,
        }
    }
}

/// Single-object response, wrapped in `data` or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ObjectEnvelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> ObjectEnvelope<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

fn flexible_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(String::from)
}

fn optional_flexible_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_podcast_accepts_both_casings() {
        let snake: Podcast = serde_json::from_value(json!({
            "id": 7,
            "title": "Rust Weekly",
            "thumbnail_url": "https://img/7.png",
            "audio_url": "https://cdn/7.mp3",
            "category_id": 3
        }))
        .unwrap();
        let camel: Podcast = serde_json::from_value(json!({
            "id": "7",
            "title": "Rust Weekly",
            "thumbnailUrl": "https://img/7.png",
            "audioUrl": "https://cdn/7.mp3",
            "categoryId": "3"
        }))
        .unwrap();

        assert_eq!(snake, camel);
        assert_eq!(snake.id.as_str(), "7");
        assert_eq!(snake.category_id.as_deref(), Some("3"));
    }

    #[test]
    fn test_list_envelope_shapes() {
        let wrapped: ListEnvelope<Category> = serde_json::from_value(json!({
            "data": [{"id": 1, "name": "Tech"}],
            "pagination": {"page": 2, "limit": 1, "total": 5, "totalPages": 5}
        }))
        .unwrap();
        let page = wrapped.into_page(2, 1);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.pagination.total, 5);
        assert!(page.pagination.has_next());

        let bare: ListEnvelope<Category> =
            serde_json::from_value(json!([{"id": "1", "name": "Tech"}, {"id": "2", "name": "News"}]))
                .unwrap();
        let page = bare.into_page(1, 20);
        assert_eq!(page.pagination, Pagination::single_page(1, 20, 2));
        assert!(!page.pagination.has_next());

        let data_only: ListEnvelope<Category> =
            serde_json::from_value(json!({"data": []})).unwrap();
        assert_eq!(data_only.into_page(1, 20).pagination.total_pages, 0);
    }

    #[test]
    fn test_object_envelope_shapes() {
        let wrapped: ObjectEnvelope<Category> =
            serde_json::from_value(json!({"data": {"id": 1, "name": "Tech"}})).unwrap();
        let bare: ObjectEnvelope<Category> =
            serde_json::from_value(json!({"id": 1, "name": "Tech"})).unwrap();
        assert_eq!(wrapped.into_inner(), bare.into_inner());
    }

    #[test]
    fn test_profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            name: Some("Ada".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"name": "Ada"}));
    }

    #[test]
    fn test_podcast_conversions() {
        let podcast: Podcast = serde_json::from_value(json!({
            "id": "p1",
            "title": "Episode",
            "author": "Host",
            "durationSecs": 1800
        }))
        .unwrap();

        let favorite = podcast.to_favorite_item();
        assert_eq!(favorite.id.as_str(), "p1");
        assert_eq!(favorite.thumbnail_url, "");

        let listen = podcast.to_listen_item();
        assert_eq!(listen.author.as_deref(), Some("Host"));
        assert_eq!(listen.duration_secs, Some(1800));
    }
}
