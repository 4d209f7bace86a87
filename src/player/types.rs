//! Small shared types for the player core: transport state, backend events
//! and the progress handle shared between backend workers and the UI.

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Lifecycle phase of the player.
///
/// `Loading` covers the window between issuing a load/play pair and the
/// backend confirming it; the UI treats it as playing so selection feels
/// immediate even though actual media start is asynchronous.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Playing,
    Paused,
}

impl Default for Phase {
    fn default() -> Self {
        Self::Idle
    }
}

/// The player's current track/play/scrub/volume state.
///
/// Invariants, maintained by the controller:
/// - playing (or loading) implies `current.is_some()`
/// - `phase == Idle` exactly when `current.is_none()`
#[derive(Debug, Clone)]
pub struct TransportState {
    /// Index into the catalog of the loaded track, if any.
    pub current: Option<usize>,
    pub phase: Phase,
    /// True while the user is dragging the seek control; progress readings
    /// must not overwrite the displayed position until commit/cancel.
    pub scrubbing: bool,
    /// Displayed seek position while scrubbing, in `[0, 1]`.
    pub scrub_fraction: f64,
    /// Volume in `[0, 100]`.
    pub volume: u8,
}

impl TransportState {
    pub fn new(volume: u8) -> Self {
        Self {
            current: None,
            phase: Phase::Idle,
            scrubbing: false,
            scrub_fraction: 0.0,
            volume: volume.min(100),
        }
    }

    /// Whether the UI should show the playing glyph (optimistic: `Loading`
    /// counts, matching the immediate icon flip on track selection).
    pub fn is_playing(&self) -> bool {
        matches!(self.phase, Phase::Playing | Phase::Loading)
    }
}

impl Default for TransportState {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Events emitted by a playback backend, drained by the runtime loop.
///
/// Track-scoped events carry the epoch of the `load` they belong to so the
/// controller can drop confirmations for tracks that are no longer selected.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// Remote backend finished its asynchronous initialization.
    Ready,
    /// Playback actually started.
    Started { epoch: u64 },
    /// Playback was paused outside the controller (e.g. another MPD client).
    Paused { epoch: u64 },
    /// The environment refused to start playback.
    Rejected { epoch: u64 },
    /// The current track played to its end.
    Ended { epoch: u64 },
}

impl BackendEvent {
    /// The epoch this event is scoped to, if it is track-scoped.
    pub fn epoch(&self) -> Option<u64> {
        match self {
            BackendEvent::Ready => None,
            BackendEvent::Started { epoch }
            | BackendEvent::Paused { epoch }
            | BackendEvent::Rejected { epoch }
            | BackendEvent::Ended { epoch } => Some(*epoch),
        }
    }
}

/// Position/duration reading published by the backend worker.
#[derive(Debug, Clone, Default)]
pub struct Progress {
    pub position: Duration,
    pub duration: Option<Duration>,
}

pub type ProgressHandle = Arc<Mutex<Progress>>;

/// Snapshot of the shared progress, safe to hand to the view layer.
#[derive(Debug, Copy, Clone, Default)]
pub struct ProgressReading {
    pub position: Duration,
    pub duration: Option<Duration>,
}

impl ProgressReading {
    pub fn from_handle(handle: &ProgressHandle) -> Self {
        handle
            .lock()
            .map(|p| Self {
                position: p.position,
                duration: p.duration,
            })
            .unwrap_or_default()
    }
}
