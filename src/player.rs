//! The player core: transport state machine, backend abstraction and the two
//! backend variants (local rodio playback, remote MPD control).

mod backend;
mod controller;
mod error;
mod local;
mod remote;
mod types;

pub use backend::{PlaybackBackend, backend_for};
pub use controller::PlayerController;
pub use error::PlayerError;
pub use types::{BackendEvent, Phase, ProgressReading, TransportState};

#[cfg(test)]
mod tests;
