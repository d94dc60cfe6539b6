//! Platform media engine traits
//!
//! Decoding and streaming are done by the platform. The session only sees an
//! engine that opens a URI and a handle that accepts transport commands;
//! progress flows back through a [`StatusSink`] stamped with the generation of
//! the load that created it.

use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

/// Monotonic tag assigned to each loaded resource
///
/// Status updates carrying an older generation belong to a resource that has
/// since been replaced or unloaded and are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(pub(crate) u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Status pushed by the engine
///
/// `position_ms` is signed because engines occasionally report slightly out
/// of range values; the session clamps them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaStatus {
    pub position_ms: i64,
    pub duration_ms: u64,
    pub is_playing: bool,
    pub did_just_finish: bool,
}

/// Options passed to the engine when opening a resource
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    pub should_autoplay: bool,
    pub looping: bool,
    pub volume: f32,
    pub rate: f32,
    pub preserve_pitch: bool,
}

/// Status update tagged with the generation it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate {
    pub generation: Generation,
    pub status: MediaStatus,
}

/// Callback channel handed to the engine for one loaded resource
#[derive(Debug, Clone)]
pub struct StatusSink {
    generation: Generation,
    tx: UnboundedSender<StatusUpdate>,
}

impl StatusSink {
    pub(crate) fn new(generation: Generation, tx: UnboundedSender<StatusUpdate>) -> Self {
        Self { generation, tx }
    }

    /// Generation of the resource this sink reports for
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Push a status update
    ///
    /// Returns `false` once the session is gone; engines may stop reporting.
    pub fn send(&self, status: MediaStatus) -> bool {
        self.tx
            .send(StatusUpdate {
                generation: self.generation,
                status,
            })
            .is_ok()
    }
}

/// A resource opened by the engine
pub struct LoadedMedia {
    pub handle: Box<dyn MediaHandle>,
    pub status: MediaStatus,
}

/// Platform media engine
///
/// Implementations wrap the platform player (AVPlayer, ExoPlayer, ...).
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Open `uri` and start reporting status through `sink`
    ///
    /// # Returns
    /// * `Ok(LoadedMedia)` - handle for transport commands + initial status
    /// * `Err(_)` - resource could not be opened
    async fn load(&self, uri: &str, options: LoadOptions, sink: StatusSink) -> Result<LoadedMedia>;
}

/// Transport commands for one loaded resource
///
/// Commands are dispatched, not awaited: their effect is only known once a
/// later status update confirms it.
pub trait MediaHandle: Send {
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    fn seek_to(&mut self, position_ms: u64) -> Result<()>;

    fn set_volume(&mut self, volume: f32) -> Result<()>;

    fn set_rate(&mut self, rate: f32, preserve_pitch: bool) -> Result<()>;

    /// Current engine-side status (may differ from the session's view, e.g.
    /// after the OS paused playback)
    fn status(&self) -> Result<MediaStatus>;

    /// Release the engine resource
    fn unload(&mut self) -> Result<()>;
}
