//! Error taxonomy for the player core. Rejected playback is a recoverable
//! state (the transport falls back to paused), not a failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayerError {
    /// A track index outside `[0, catalog.len())` was requested.
    #[error("track index {index} out of range (catalog has {len} tracks)")]
    InvalidIndex { index: usize, len: usize },

    /// The environment refused to start playback (missing device, undecodable
    /// file, daemon error).
    #[error("playback rejected: {0}")]
    PlaybackRejected(String),

    /// The backend worker is gone (channel closed).
    #[error("backend unavailable: {0}")]
    Backend(String),
}
