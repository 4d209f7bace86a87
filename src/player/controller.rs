//! The player controller: owns the catalog, the backend and the transport
//! state, and is the only thing allowed to mutate the latter.
//!
//! Phases: `Idle -> Loading -> Playing <-> Paused`. Selection updates the
//! transport synchronously before the backend confirms anything, so the
//! interface never appears unresponsive; confirmations are matched against
//! an epoch bumped on every load, which discards callbacks for tracks that
//! are no longer selected.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::catalog::Catalog;

use super::backend::PlaybackBackend;
use super::error::PlayerError;
use super::types::{BackendEvent, Phase, ProgressReading, TransportState};

pub struct PlayerController {
    catalog: Catalog,
    backend: Box<dyn PlaybackBackend>,
    transport: TransportState,
    /// Bumped on every load/close; stale backend events are dropped.
    epoch: u64,
}

impl PlayerController {
    pub fn new(catalog: Catalog, mut backend: Box<dyn PlaybackBackend>, volume: u8) -> Self {
        let transport = TransportState::new(volume);
        if let Err(e) = backend.set_volume(transport.volume) {
            warn!(error = %e, "initial volume not applied");
        }
        Self {
            catalog,
            backend,
            transport,
            epoch: 0,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn transport(&self) -> &TransportState {
        &self.transport
    }

    /// Current backend position/duration reading for the view layer.
    pub fn progress(&self) -> ProgressReading {
        ProgressReading {
            position: self.backend.position(),
            duration: self.backend.duration(),
        }
    }

    /// Select and start a track. The transport (and therefore both UI
    /// surfaces) updates before the backend is asked to do anything.
    pub fn select_track(&mut self, index: usize) -> Result<(), PlayerError> {
        let track = self.catalog.get(index)?.clone();

        self.epoch += 1;
        self.transport.current = Some(index);
        self.transport.phase = Phase::Loading;
        self.transport.scrubbing = false;

        info!(index, title = %track.title, "track selected");
        self.backend.load(&track, self.epoch)?;
        // A rejected play falls back to paused via the Rejected event; it is
        // logged, never surfaced.
        if let Err(e) = self.backend.play() {
            warn!(error = %e, "play request failed");
            self.transport.phase = Phase::Paused;
        }
        Ok(())
    }

    /// Flip play/pause. No-op from Idle.
    pub fn toggle_play(&mut self) {
        match self.transport.phase {
            Phase::Idle => {}
            Phase::Playing | Phase::Loading => {
                if let Err(e) = self.backend.pause() {
                    warn!(error = %e, "pause request failed");
                }
                self.transport.phase = Phase::Paused;
            }
            Phase::Paused => {
                if let Err(e) = self.backend.play() {
                    warn!(error = %e, "play request failed");
                } else {
                    self.transport.phase = Phase::Playing;
                }
            }
        }
    }

    /// Advance to the next track, wrapping at the end. From Idle this plays
    /// the first track.
    pub fn next(&mut self) {
        let len = self.catalog.len();
        if len == 0 {
            return;
        }
        let target = match self.transport.current {
            Some(i) => (i + 1) % len,
            None => 0,
        };
        if let Err(e) = self.select_track(target) {
            warn!(error = %e, "next failed");
        }
    }

    /// Go to the previous track, wrapping at the start. From Idle this plays
    /// the last track.
    pub fn previous(&mut self) {
        let len = self.catalog.len();
        if len == 0 {
            return;
        }
        let target = match self.transport.current {
            Some(i) => (i + len - 1) % len,
            None => len - 1,
        };
        if let Err(e) = self.select_track(target) {
            warn!(error = %e, "previous failed");
        }
    }

    /// Begin a seek drag; progress readings stop driving the displayed
    /// position until commit or cancel.
    pub fn seek_start(&mut self) {
        if self.transport.current.is_none() {
            return;
        }
        if !self.transport.scrubbing {
            self.transport.scrubbing = true;
            self.transport.scrub_fraction = current_fraction(&self.progress());
        }
    }

    /// Move the in-progress drag. Display-only; the backend is not touched.
    pub fn seek_drag(&mut self, fraction: f64) {
        if self.transport.scrubbing {
            self.transport.scrub_fraction = fraction.clamp(0.0, 1.0);
        }
    }

    /// Commit the drag: seek to `fraction * duration` and resume normal
    /// progress display.
    pub fn seek_commit(&mut self, fraction: f64) {
        let fraction = fraction.clamp(0.0, 1.0);
        self.transport.scrubbing = false;
        let Some(total) = self.backend.duration() else {
            return;
        };
        if total.is_zero() {
            return;
        }
        let target = Duration::from_secs_f64(total.as_secs_f64() * fraction);
        if let Err(e) = self.backend.seek(target) {
            warn!(error = %e, "seek failed");
        }
    }

    /// Abort the drag without seeking.
    pub fn seek_cancel(&mut self) {
        self.transport.scrubbing = false;
    }

    /// Clamp to `[0, 100]` and forward immediately.
    pub fn set_volume(&mut self, volume: i64) {
        let clamped = volume.clamp(0, 100) as u8;
        self.transport.volume = clamped;
        if let Err(e) = self.backend.set_volume(clamped) {
            warn!(error = %e, "volume not applied");
        }
    }

    /// Nudge the volume by `delta` percentage points.
    pub fn adjust_volume(&mut self, delta: i64) {
        self.set_volume(self.transport.volume as i64 + delta);
    }

    /// Close the player bar: stop playback, rewind and return to Idle.
    /// In-flight confirmations for the old track become stale.
    pub fn close(&mut self) {
        if self.transport.current.is_none() {
            return;
        }
        self.epoch += 1;
        if let Err(e) = self.backend.pause() {
            warn!(error = %e, "pause on close failed");
        }
        let _ = self.backend.seek(Duration::ZERO);
        self.transport.current = None;
        self.transport.phase = Phase::Idle;
        self.transport.scrubbing = false;
        info!("player closed");
    }

    /// Drain and apply backend events. Called once per runtime tick.
    pub fn pump_events(&mut self) {
        for event in self.backend.poll_events() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: BackendEvent) {
        // Epoch guard: confirmations for a load that is no longer current
        // must not overwrite newer transport state.
        if let Some(epoch) = event.epoch()
            && epoch != self.epoch
        {
            debug!(?event, current_epoch = self.epoch, "stale backend event dropped");
            return;
        }

        match event {
            BackendEvent::Ready => {
                info!("backend ready");
            }
            BackendEvent::Started { .. } => {
                if self.transport.current.is_some() {
                    self.transport.phase = Phase::Playing;
                }
            }
            BackendEvent::Paused { .. } => {
                if self.transport.current.is_some() {
                    self.transport.phase = Phase::Paused;
                }
            }
            BackendEvent::Rejected { .. } => {
                // Autoplay blocked or media unusable: fall back to paused,
                // keep the selection so the user can retry.
                warn!(current = ?self.transport.current, "playback rejected, falling back to paused");
                if self.transport.current.is_some() {
                    self.transport.phase = Phase::Paused;
                }
            }
            BackendEvent::Ended { .. } => {
                if matches!(self.transport.phase, Phase::Playing | Phase::Loading) {
                    self.next();
                }
            }
        }
    }

    /// Release the backend worker. Called once on shutdown.
    pub fn shutdown(&mut self) {
        self.backend.shutdown();
    }
}

fn current_fraction(reading: &ProgressReading) -> f64 {
    match reading.duration {
        Some(total) if !total.is_zero() => {
            (reading.position.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
        }
        _ => 0.0,
    }
}
