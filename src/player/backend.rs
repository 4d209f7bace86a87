//! The unified interface over the two playback mechanisms.

use std::time::Duration;

use crate::catalog::{BackendKind, Catalog, TrackDescriptor};
use crate::config::Settings;

use super::error::PlayerError;
use super::local::LocalBackend;
use super::remote::RemoteBackend;
use super::types::BackendEvent;

/// Abstraction over the actual media-rendering mechanism.
///
/// One instance is active for the lifetime of the player; the concrete
/// variant is chosen at startup from the catalog shape and never swapped.
/// All methods are command-issuing and non-blocking; confirmations arrive as
/// [`BackendEvent`]s tagged with the epoch passed to `load`.
pub trait PlaybackBackend: Send {
    /// Prepare `track` for playback at position zero. Never auto-plays.
    fn load(&mut self, track: &TrackDescriptor, epoch: u64) -> Result<(), PlayerError>;

    /// Request playback of the loaded track. May be refused asynchronously,
    /// in which case a `Rejected` event arrives instead of `Started`.
    fn play(&mut self) -> Result<(), PlayerError>;

    fn pause(&mut self) -> Result<(), PlayerError>;

    /// Seek to an absolute position in the loaded track.
    fn seek(&mut self, position: Duration) -> Result<(), PlayerError>;

    /// Apply a volume in `[0, 100]`. Applied immediately, not deferred.
    fn set_volume(&mut self, volume: u8) -> Result<(), PlayerError>;

    /// Latest position reading published by the backend worker.
    fn position(&self) -> Duration;

    /// Latest duration reading, if known.
    fn duration(&self) -> Option<Duration>;

    /// Drain pending backend events. Called from the runtime loop.
    fn poll_events(&mut self) -> Vec<BackendEvent>;

    /// Stop the worker and release the device/connection.
    fn shutdown(&mut self);
}

/// Construct the backend variant the catalog requires.
pub fn backend_for(catalog: &Catalog, settings: &Settings) -> Box<dyn PlaybackBackend> {
    match catalog.backend_kind() {
        BackendKind::Local => Box::new(LocalBackend::new()),
        BackendKind::Remote => Box::new(RemoteBackend::new(
            settings.remote.clone(),
            Duration::from_millis(settings.player.poll_interval_ms),
        )),
    }
}
