//! UI sync layer: a pure projection of transport + progress onto view
//! structs, and the ratatui renderer that draws them.

mod model;
mod render;

pub use model::{PlayerBar, PlayerView, TrackRow, format_time, progress_percent, project};
pub use render::draw;

#[cfg(test)]
mod tests;
