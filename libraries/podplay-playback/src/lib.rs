//! Podplay - Playback Session
//!
//! Platform-agnostic control of a single playing episode.
//!
//! This crate provides:
//! - Load / play / pause / seek over a platform media engine
//! - Volume (clamped 0.0-1.0) and rate with pitch preservation
//! - Native looping handed to the engine at load time
//! - Generation-tagged status updates so callbacks from a released resource
//!   never touch the current one
//! - Disc rotation derived from the playing flag
//!
//! # Architecture
//!
//! Decoding, streaming and output belong to the platform. It is reached
//! through [`MediaEngine`] (open a URI) and [`MediaHandle`] (transport
//! commands for one resource). Progress comes back through the
//! [`StatusSink`] handed to the engine on load; the UI pumps it with
//! [`PlaybackSession::drain_status`] or [`PlaybackSession::next_status`] and
//! renders [`PlaybackSession::snapshot`].
//!
//! # Example
//!
//! ```rust,ignore
//! use podplay_playback::{PlaybackConfig, PlaybackSession};
//!
//! let mut session = PlaybackSession::new(engine, PlaybackConfig::default());
//! session.load_and_play("https://cdn.example.com/episode-1.mp3").await?;
//!
//! // Called from the UI loop
//! session.drain_status();
//! for event in session.drain_events() {
//!     // update UI
//! }
//!
//! session.seek(60_000)?;
//! session.toggle_playback()?;
//! ```

#![forbid(unsafe_code)]

pub mod engine;
mod error;
pub mod events;
mod session;
pub mod types;

pub use engine::{
    Generation, LoadOptions, LoadedMedia, MediaEngine, MediaHandle, MediaStatus, StatusSink,
    StatusUpdate,
};
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use session::PlaybackSession;
pub use types::{PlaybackConfig, Rotation, SessionSnapshot, SessionState};
