//! Core types for playback sessions

use podplay_core::config::PlaybackSettings;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Lifecycle of a playback session
///
/// `Idle → Loading → Ready ⇄ Playing ⇄ Paused → (Ended | Unloaded)`.
/// `Error` is terminal until the next `load_and_play`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Nothing requested yet
    Idle,

    /// Waiting for the engine to open the resource
    Loading,

    /// Resource opened, not yet playing
    Ready,

    /// Currently playing
    Playing,

    /// Paused mid-item
    Paused,

    /// Reached the end of the item
    Ended,

    /// Resource released
    Unloaded,

    /// Engine failed to open the resource
    Error,
}

impl SessionState {
    /// States in which a resource handle is held
    pub fn has_resource(self) -> bool {
        matches!(
            self,
            Self::Ready | Self::Playing | Self::Paused | Self::Ended
        )
    }

    /// States in which seeking is allowed
    pub fn can_seek(self) -> bool {
        matches!(self, Self::Ready | Self::Playing | Self::Paused)
    }
}

/// Visual feedback for the spinning disc
///
/// Always derived from `is_playing`; it has no state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    Spinning,
    Stopped,
}

impl Rotation {
    pub fn from_playing(is_playing: bool) -> Self {
        if is_playing {
            Self::Spinning
        } else {
            Self::Stopped
        }
    }
}

/// Configuration for playback sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Initial volume (0.0-1.0, default: 1.0)
    pub volume: f32,

    /// Initial rate (default: 1.0)
    pub rate: f32,

    /// Loop the item natively in the engine (applied at load time)
    pub looping: bool,

    /// Keep pitch when changing rate (default: true)
    pub preserve_pitch: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: 1.0,
            rate: 1.0,
            looping: false,
            preserve_pitch: true,
        }
    }
}

impl PlaybackConfig {
    /// Clamp volume into `[0, 1]` and replace unusable values with defaults
    ///
    /// A NaN volume or a rate that is not a positive finite number falls back
    /// to the default.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if self.volume.is_nan() {
            warn!("Initial volume is NaN, using default");
            self.volume = defaults.volume;
        } else {
            self.volume = self.volume.clamp(0.0, 1.0);
        }

        if !self.rate.is_finite() || self.rate <= 0.0 {
            warn!(rate = self.rate, "Initial rate out of range, using default");
            self.rate = defaults.rate;
        }

        self
    }
}

impl From<&PlaybackSettings> for PlaybackConfig {
    fn from(settings: &PlaybackSettings) -> Self {
        Self {
            volume: settings.volume,
            rate: settings.rate,
            looping: settings.looping,
            ..Self::default()
        }
        .sanitized()
    }
}

/// Read-only view of a session for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub resource_uri: Option<String>,
    pub is_loaded: bool,
    pub is_playing: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub volume: f32,
    pub rate: f32,
    pub looping: bool,
}

impl SessionSnapshot {
    /// Disc rotation implied by this snapshot
    pub fn rotation(&self) -> Rotation {
        Rotation::from_playing(self.is_playing)
    }

    /// Progress in `[0, 1]`, zero when the duration is unknown
    pub fn progress(&self) -> f32 {
        if self.duration_ms == 0 {
            0.0
        } else {
            (self.position_ms as f64 / self.duration_ms as f64) as f32
        }
    }
}
