//! Playback session
//!
//! Owns at most one engine resource at a time and mirrors the engine's
//! progress into a snapshot the UI can render. Commands go straight to the
//! engine; the session's view is corrected by the status updates that follow.

use crate::{
    engine::{Generation, LoadOptions, MediaEngine, MediaHandle, MediaStatus, StatusSink, StatusUpdate},
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    types::{PlaybackConfig, Rotation, SessionSnapshot, SessionState},
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, trace, warn};

/// Engine resource tagged with the generation of the load that opened it
///
/// Dropping it releases the engine resource, so every exit path of the
/// session (unload, replacement, drop) frees the platform player.
struct ActiveResource {
    generation: Generation,
    uri: String,
    handle: Option<Box<dyn MediaHandle>>,
}

impl ActiveResource {
    fn new(generation: Generation, uri: String, handle: Box<dyn MediaHandle>) -> Self {
        Self {
            generation,
            uri,
            handle: Some(handle),
        }
    }

    fn handle_mut(&mut self) -> Result<&mut Box<dyn MediaHandle>> {
        self.handle.as_mut().ok_or(PlaybackError::NotLoaded)
    }

    fn handle(&self) -> Result<&dyn MediaHandle> {
        self.handle.as_deref().ok_or(PlaybackError::NotLoaded)
    }

    /// Release the engine resource now
    fn release(&mut self) -> Result<()> {
        match self.handle.take() {
            Some(mut handle) => handle.unload(),
            None => Ok(()),
        }
    }
}

impl Drop for ActiveResource {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(uri = %self.uri, error = %e, "Failed to release media resource");
        }
    }
}

/// Playback session over a platform media engine
pub struct PlaybackSession<E: MediaEngine> {
    engine: E,
    config: PlaybackConfig,
    state: SessionState,

    resource: Option<ActiveResource>,
    resource_uri: Option<String>,
    next_generation: u64,

    // Mirrored from the engine
    is_playing: bool,
    position_ms: u64,
    duration_ms: u64,

    // Applied to the current resource
    volume: f32,
    rate: f32,
    looping: bool,

    status_tx: UnboundedSender<StatusUpdate>,
    status_rx: UnboundedReceiver<StatusUpdate>,

    // Event queue for UI synchronization
    pending_events: Vec<PlaybackEvent>,
}

impl<E: MediaEngine> PlaybackSession<E> {
    /// Create an idle session
    ///
    /// Out-of-range initial volume or rate is replaced, see
    /// [`PlaybackConfig::sanitized`].
    pub fn new(engine: E, config: PlaybackConfig) -> Self {
        let config = config.sanitized();
        let (status_tx, status_rx) = mpsc::unbounded_channel();

        Self {
            engine,
            volume: config.volume,
            rate: config.rate,
            looping: config.looping,
            config,
            state: SessionState::Idle,
            resource: None,
            resource_uri: None,
            next_generation: 0,
            is_playing: false,
            position_ms: 0,
            duration_ms: 0,
            status_tx,
            status_rx,
            pending_events: Vec::new(),
        }
    }

    /// The media engine backing this session
    pub fn engine(&self) -> &E {
        &self.engine
    }

    // ===== Loading =====

    /// Release any current resource, then open `uri` and start playing
    ///
    /// On failure the session ends in `Error` with no resource held.
    pub async fn load_and_play(&mut self, uri: &str) -> Result<()> {
        self.release_current();

        self.next_generation += 1;
        let generation = Generation(self.next_generation);

        self.resource_uri = Some(uri.to_string());
        self.position_ms = 0;
        self.duration_ms = 0;
        self.looping = self.config.looping;
        self.set_state(SessionState::Loading);

        let options = LoadOptions {
            should_autoplay: true,
            looping: self.looping,
            volume: self.volume,
            rate: self.rate,
            preserve_pitch: self.config.preserve_pitch,
        };
        let sink = StatusSink::new(generation, self.status_tx.clone());

        debug!(uri, generation = generation.value(), "Loading media");

        match self.engine.load(uri, options, sink).await {
            Ok(loaded) => {
                self.resource = Some(ActiveResource::new(generation, uri.to_string(), loaded.handle));
                self.set_state(SessionState::Ready);
                self.apply_progress(&loaded.status);

                // Autoplay was requested; later updates reconcile if the engine disagrees
                self.set_playing(true);
                self.set_state(SessionState::Playing);

                info!(uri, duration_ms = self.duration_ms, "Media loaded");
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                warn!(uri, error = %reason, "Failed to load media");

                self.set_state(SessionState::Error);
                self.pending_events.push(PlaybackEvent::Error {
                    message: reason.clone(),
                });

                Err(PlaybackError::Load {
                    uri: uri.to_string(),
                    reason,
                })
            }
        }
    }

    /// Release the current resource
    ///
    /// Valid from any state except `Unloaded`. The session ends in `Unloaded`
    /// even if the engine reports an error while releasing.
    pub fn unload(&mut self) -> Result<()> {
        if self.state == SessionState::Unloaded {
            return Err(PlaybackError::InvalidState {
                operation: "unload",
                state: self.state,
            });
        }

        let released = match self.resource.take() {
            Some(mut resource) => resource.release(),
            None => Ok(()),
        };

        self.set_playing(false);
        self.set_state(SessionState::Unloaded);
        debug!(uri = ?self.resource_uri, "Media unloaded");

        released
    }

    fn release_current(&mut self) {
        if let Some(mut resource) = self.resource.take() {
            if let Err(e) = resource.release() {
                warn!(uri = %resource.uri, error = %e, "Failed to release previous media");
            }
        }
        self.set_playing(false);
    }

    // ===== Status Updates =====

    /// Apply every status update already queued by the engine
    ///
    /// Returns the number of updates that were applied (stale ones are not
    /// counted).
    pub fn drain_status(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.status_rx.try_recv() {
            if self.apply_status(update) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next status update and apply it
    ///
    /// Returns whether the update was applied.
    pub async fn next_status(&mut self) -> bool {
        match self.status_rx.recv().await {
            Some(update) => self.apply_status(update),
            None => false,
        }
    }

    fn apply_status(&mut self, update: StatusUpdate) -> bool {
        let Some(resource) = &self.resource else {
            trace!(generation = update.generation.value(), "Status ignored: nothing loaded");
            return false;
        };

        if resource.generation != update.generation {
            debug!(
                current = resource.generation.value(),
                stale = update.generation.value(),
                "Discarding stale status update"
            );
            return false;
        }

        let status = update.status;

        if status.did_just_finish && !self.looping {
            let uri = resource.uri.clone();
            self.duration_ms = status.duration_ms;
            self.position_ms = 0;
            self.set_playing(false);
            self.set_state(SessionState::Ended);
            self.pending_events.push(PlaybackEvent::Finished { uri });
            return true;
        }

        // Position stays reset after finishing until playback resumes
        if self.state == SessionState::Ended && !status.is_playing {
            trace!(position_ms = status.position_ms, "Status ignored: item ended");
            return true;
        }

        self.apply_progress(&status);

        if status.is_playing != self.is_playing {
            self.set_playing(status.is_playing);
            self.set_state(if status.is_playing {
                SessionState::Playing
            } else {
                SessionState::Paused
            });
        }

        true
    }

    fn apply_progress(&mut self, status: &MediaStatus) {
        self.duration_ms = status.duration_ms;
        self.position_ms = clamp_position(status.position_ms, self.duration_ms);
        self.pending_events.push(PlaybackEvent::PositionUpdate {
            position_ms: self.position_ms,
            duration_ms: self.duration_ms,
        });
    }

    // ===== Transport =====

    /// Pause if the engine is playing, otherwise play
    ///
    /// Decides from the engine's status rather than the session's view, since
    /// the platform may have paused on its own. Returns the new `is_playing`.
    pub fn toggle_playback(&mut self) -> Result<bool> {
        if !self.state.has_resource() {
            return Err(PlaybackError::InvalidState {
                operation: "toggle playback",
                state: self.state,
            });
        }

        let restart = self.state == SessionState::Ended;
        let resource = self.resource.as_mut().ok_or(PlaybackError::NotLoaded)?;
        let engine_playing = resource.handle()?.status()?.is_playing;

        let handle = resource.handle_mut()?;
        let now_playing = if engine_playing {
            handle.pause()?;
            false
        } else {
            if restart {
                handle.seek_to(0)?;
            }
            handle.play()?;
            true
        };

        self.set_playing(now_playing);
        self.set_state(if now_playing {
            SessionState::Playing
        } else {
            SessionState::Paused
        });

        Ok(now_playing)
    }

    /// Seek to `position_ms`, clamped to `[0, duration]`
    ///
    /// Returns the clamped target. The session's position is not changed here;
    /// it follows the engine's next status update.
    pub fn seek(&mut self, position_ms: i64) -> Result<u64> {
        if !self.state.can_seek() {
            return Err(PlaybackError::InvalidState {
                operation: "seek",
                state: self.state,
            });
        }

        let target = clamp_position(position_ms, self.duration_ms);
        let resource = self.resource.as_mut().ok_or(PlaybackError::NotLoaded)?;
        resource.handle_mut()?.seek_to(target)?;

        debug!(requested = position_ms, target, "Seek dispatched");
        Ok(target)
    }

    // ===== Volume / Rate / Looping =====

    /// Set volume, clamped to `[0, 1]`
    ///
    /// Returns the applied volume.
    pub fn set_volume(&mut self, volume: f32) -> Result<f32> {
        if volume.is_nan() {
            return Err(PlaybackError::InvalidArgument("volume is NaN".to_string()));
        }
        let volume = volume.clamp(0.0, 1.0);

        self.loaded_handle()?.set_volume(volume)?;
        self.volume = volume;
        self.pending_events.push(PlaybackEvent::VolumeChanged { volume });
        Ok(volume)
    }

    /// Set playback rate, keeping pitch if configured
    ///
    /// Non-positive or non-finite rates are rejected and leave the rate
    /// unchanged.
    pub fn set_rate(&mut self, rate: f32) -> Result<()> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(PlaybackError::InvalidArgument(format!(
                "rate must be a positive number, got {rate}"
            )));
        }

        let preserve_pitch = self.config.preserve_pitch;
        self.loaded_handle()?.set_rate(rate, preserve_pitch)?;
        self.rate = rate;
        self.pending_events.push(PlaybackEvent::RateChanged { rate });
        Ok(())
    }

    /// Set looping for the next load
    ///
    /// The engine loops natively, so the flag is handed over at load time.
    pub fn set_looping(&mut self, looping: bool) {
        self.config.looping = looping;
    }

    fn loaded_handle(&mut self) -> Result<&mut Box<dyn MediaHandle>> {
        if !self.state.has_resource() {
            return Err(PlaybackError::NotLoaded);
        }
        self.resource
            .as_mut()
            .ok_or(PlaybackError::NotLoaded)?
            .handle_mut()
    }

    // ===== State Queries =====

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_loaded(&self) -> bool {
        self.resource.is_some()
    }

    pub fn rotation(&self) -> Rotation {
        Rotation::from_playing(self.is_playing)
    }

    /// Snapshot of everything the UI renders
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            resource_uri: self.resource_uri.clone(),
            is_loaded: self.is_loaded(),
            is_playing: self.is_playing,
            position_ms: self.position_ms,
            duration_ms: self.duration_ms,
            volume: self.volume,
            rate: self.rate,
            looping: self.looping,
        }
    }

    // ===== Events =====

    /// Take all events queued since the last call
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            trace!(from = ?self.state, to = ?state, "Session state changed");
            self.state = state;
            self.pending_events.push(PlaybackEvent::StateChanged { state });
        }
    }

    fn set_playing(&mut self, is_playing: bool) {
        if self.is_playing != is_playing {
            self.is_playing = is_playing;
            self.pending_events.push(PlaybackEvent::RotationChanged {
                rotation: Rotation::from_playing(is_playing),
            });
        }
    }
}

fn clamp_position(position_ms: i64, duration_ms: u64) -> u64 {
    if position_ms <= 0 {
        0
    } else {
        (position_ms as u64).min(duration_ms)
    }
}
