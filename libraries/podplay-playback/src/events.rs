//! Playback Events
//!
//! Event-based communication for UI synchronization. The session queues
//! events as its state changes; the UI drains them after each command or
//! status pump.

use crate::types::{Rotation, SessionState};
use serde::{Deserialize, Serialize};

/// Events emitted by a playback session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Session state changed
    StateChanged {
        /// The new state
        state: SessionState,
    },

    /// Position reported by the engine (already clamped)
    PositionUpdate {
        position_ms: u64,
        duration_ms: u64,
    },

    /// Item played to the end
    Finished {
        /// URI of the finished resource
        uri: String,
    },

    /// Volume applied (0.0-1.0)
    VolumeChanged { volume: f32 },

    /// Rate applied
    RateChanged { rate: f32 },

    /// Disc animation should start or stop
    ///
    /// Emitted from the same transition that flips `is_playing`.
    RotationChanged { rotation: Rotation },

    /// Error surfaced to the UI
    Error {
        /// Error message
        message: String,
    },
}
