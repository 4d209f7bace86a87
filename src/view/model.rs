//! Pure projection of transport state + backend readings onto the two UI
//! surfaces: the track list rows and the persistent player bar.
//!
//! Nothing in here mutates transport state; the renderer consumes the
//! resulting structs verbatim. Time labels use `M:SS` with zero-padded
//! seconds, and anything unknowable (no duration, NaN) renders as `0:00`
//! rather than leaking garbage into the UI.

use std::time::Duration;

use crate::catalog::Catalog;
use crate::player::{ProgressReading, TransportState};

pub const PLAY_GLYPH: &str = "▶";
pub const PAUSE_GLYPH: &str = "⏸";

/// One row of the track list.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRow {
    pub title: String,
    pub artist: String,
    /// Exactly one row is active: the one holding the loaded track.
    pub active: bool,
    /// Pause glyph iff this row is active and the player is playing.
    pub glyph: &'static str,
}

/// The persistent player bar. Hidden while the transport is Idle.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerBar {
    pub visible: bool,
    pub title: String,
    pub artist: String,
    pub artwork: Option<String>,
    pub playing: bool,
    /// Fill percentage of the progress bar, clamped to `[0, 100]`.
    pub percent: f64,
    pub elapsed: String,
    pub total: String,
    pub volume: u8,
}

impl PlayerBar {
    fn hidden() -> Self {
        Self {
            visible: false,
            title: String::new(),
            artist: String::new(),
            artwork: None,
            playing: false,
            percent: 0.0,
            elapsed: format_time(f64::NAN),
            total: format_time(f64::NAN),
            volume: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub rows: Vec<TrackRow>,
    pub bar: PlayerBar,
}

/// Format seconds as `M:SS`. NaN, infinities and negatives render `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Progress-bar fill for a reading, clamped to `[0, 100]`. A missing or zero
/// duration yields 0 instead of NaN.
pub fn progress_percent(position: Duration, duration: Option<Duration>) -> f64 {
    match duration {
        Some(total) if !total.is_zero() => {
            (position.as_secs_f64() / total.as_secs_f64() * 100.0).clamp(0.0, 100.0)
        }
        _ => 0.0,
    }
}

/// Build the full view for one frame.
pub fn project(catalog: &Catalog, transport: &TransportState, reading: ProgressReading) -> PlayerView {
    let playing = transport.is_playing();

    let rows = catalog
        .iter()
        .map(|track| {
            let active = transport.current == Some(track.index);
            TrackRow {
                title: track.title.clone(),
                artist: track.artist.clone(),
                active,
                glyph: if active && playing {
                    PAUSE_GLYPH
                } else {
                    PLAY_GLYPH
                },
            }
        })
        .collect();

    let bar = match transport.current.and_then(|i| catalog.get(i).ok()) {
        None => PlayerBar::hidden(),
        Some(track) => {
            let duration = reading.duration.or(track.duration);
            let total_secs = duration.map(|d| d.as_secs_f64());

            // While the user drags the seek control, the drag position wins
            // over whatever the backend reports.
            let (percent, elapsed) = if transport.scrubbing {
                let fraction = transport.scrub_fraction.clamp(0.0, 1.0);
                let elapsed_secs = total_secs.map(|t| t * fraction).unwrap_or(f64::NAN);
                (fraction * 100.0, format_time(elapsed_secs))
            } else {
                (
                    progress_percent(reading.position, duration),
                    format_time(reading.position.as_secs_f64()),
                )
            };

            PlayerBar {
                visible: true,
                title: track.title.clone(),
                artist: track.artist.clone(),
                artwork: track.artwork.clone(),
                playing,
                percent,
                elapsed,
                total: format_time(total_secs.unwrap_or(f64::NAN)),
                volume: transport.volume,
            }
        }
    };

    PlayerView { rows, bar }
}
