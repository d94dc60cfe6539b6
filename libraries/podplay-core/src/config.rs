//! Application configuration
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
///
/// Loaded from an optional TOML file, then overridden by `PODPLAY_`-prefixed
/// environment variables using `__` between sections
/// (`PODPLAY_API__BASE_URL`, `PODPLAY_HISTORY__CAPACITY`, ...).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Podcast API endpoint and auth
    #[serde(default)]
    pub api: ApiSettings,

    /// Where favorites and history are kept
    #[serde(default)]
    pub storage: StorageSettings,

    /// Listening history limits
    #[serde(default)]
    pub history: HistorySettings,

    /// Search-as-you-type tuning
    #[serde(default)]
    pub search: SearchSettings,

    /// Initial playback session settings
    #[serde(default)]
    pub playback: PlaybackSettings,
}

/// Podcast API settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiSettings {
    /// API root, e.g. `https://api.example.com/api`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// `bearer` for `Authorization: Bearer`, anything else is used as a
    /// custom header name carrying the raw token
    #[serde(default = "default_auth_header")]
    pub auth_header: String,
}

/// Local storage settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    /// Directory backing the key-value store
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Listening history settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistorySettings {
    /// Maximum entries kept, oldest dropped first
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

/// Search settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchSettings {
    /// Quiet period after the last keystroke before a search is sent
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Initial playback settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    /// Volume in `[0, 1]`
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Playback rate, must be positive
    #[serde(default = "default_rate")]
    pub rate: f32,

    /// Loop each item
    #[serde(default)]
    pub looping: bool,
}

impl AppConfig {
    /// Load configuration from an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            settings = settings.add_source(config::File::from(path.to_path_buf()).required(true));
        } else {
            let default_path = PathBuf::from("podplay.toml");
            if default_path.exists() {
                settings = settings.add_source(config::File::from(default_path));
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("PODPLAY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings
            .build()
            .map_err(|e| CoreError::config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CoreError::config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(CoreError::config(
                "API base URL is required (set PODPLAY_API__BASE_URL)",
            ));
        }

        if self.api.auth_header.trim().is_empty() {
            return Err(CoreError::config("api.auth_header cannot be empty"));
        }

        if self.history.capacity == 0 {
            return Err(CoreError::config("history.capacity must be at least 1"));
        }

        if !(0.0..=1.0).contains(&self.playback.volume) {
            return Err(CoreError::config(format!(
                "playback.volume must be within 0.0..=1.0, got {}",
                self.playback.volume
            )));
        }

        if !self.playback.rate.is_finite() || self.playback.rate <= 0.0 {
            return Err(CoreError::config(format!(
                "playback.rate must be positive, got {}",
                self.playback.rate
            )));
        }

        Ok(())
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            auth_header: default_auth_header(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            rate: default_rate(),
            looping: false,
        }
    }
}

// Default values
fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_auth_header() -> String {
    "bearer".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".podplay")
}

fn default_history_capacity() -> usize {
    50
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_volume() -> f32 {
    1.0
}

fn default_rate() -> f32 {
    1.0
}
