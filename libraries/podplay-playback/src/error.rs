//! Error types for playback sessions

use crate::types::SessionState;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Media engine failed to open the resource
    #[error("Failed to load {uri}: {reason}")]
    Load { uri: String, reason: String },

    /// Out-of-range or non-finite argument (volume, rate)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No resource is loaded
    #[error("No media loaded")]
    NotLoaded,

    /// Operation not valid in the current state
    #[error("Cannot {operation} while {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    /// Media engine rejected a command
    #[error("Media engine error: {0}")]
    Engine(String),
}

impl PlaybackError {
    /// Create a media engine error
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
