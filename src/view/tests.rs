use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::{BackendKind, Catalog, MediaRef, TrackDescriptor};
use crate::player::{Phase, ProgressReading, TransportState};

use super::model::{PAUSE_GLYPH, PLAY_GLYPH, format_time, progress_percent, project};

fn catalog(titles: &[&str]) -> Catalog {
    let tracks = titles
        .iter()
        .enumerate()
        .map(|(index, title)| TrackDescriptor {
            index,
            media: MediaRef::File(PathBuf::from(format!("/tmp/{title}.mp3"))),
            title: title.to_string(),
            artist: format!("{title} artist"),
            artwork: Some(format!("art/{title}.jpg")),
            duration: Some(Duration::from_secs(200)),
        })
        .collect();
    Catalog::new(tracks, BackendKind::Local)
}

fn reading(position: u64, duration: Option<u64>) -> ProgressReading {
    ProgressReading {
        position: Duration::from_secs(position),
        duration: duration.map(Duration::from_secs),
    }
}

#[test]
fn format_time_matches_mmss_contract() {
    assert_eq!(format_time(f64::NAN), "0:00");
    assert_eq!(format_time(f64::INFINITY), "0:00");
    assert_eq!(format_time(-3.0), "0:00");
    assert_eq!(format_time(0.0), "0:00");
    assert_eq!(format_time(5.0), "0:05");
    assert_eq!(format_time(65.0), "1:05");
    assert_eq!(format_time(600.0), "10:00");
    assert_eq!(format_time(59.9), "0:59");
}

#[test]
fn progress_percent_is_clamped_and_nan_free() {
    assert_eq!(progress_percent(Duration::from_secs(50), Some(Duration::from_secs(200))), 25.0);
    assert_eq!(progress_percent(Duration::from_secs(500), Some(Duration::from_secs(200))), 100.0);
    assert_eq!(progress_percent(Duration::from_secs(10), Some(Duration::ZERO)), 0.0);
    assert_eq!(progress_percent(Duration::from_secs(10), None), 0.0);
}

#[test]
fn exactly_one_active_row_with_playing_glyph() {
    let catalog = catalog(&["A", "B", "C"]);
    let mut transport = TransportState::new(80);
    transport.current = Some(1);
    transport.phase = Phase::Playing;

    let view = project(&catalog, &transport, reading(0, Some(200)));

    let active: Vec<usize> = view
        .rows
        .iter()
        .enumerate()
        .filter(|(_, r)| r.active)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(active, vec![1]);
    assert_eq!(view.rows[1].glyph, PAUSE_GLYPH);
    assert_eq!(view.rows[0].glyph, PLAY_GLYPH);
    assert_eq!(view.rows[2].glyph, PLAY_GLYPH);
}

#[test]
fn paused_active_row_shows_play_glyph() {
    let catalog = catalog(&["A", "B"]);
    let mut transport = TransportState::new(80);
    transport.current = Some(0);
    transport.phase = Phase::Paused;

    let view = project(&catalog, &transport, reading(0, Some(200)));
    assert!(view.rows[0].active);
    assert_eq!(view.rows[0].glyph, PLAY_GLYPH);
}

#[test]
fn loading_counts_as_playing_for_the_glyph() {
    let catalog = catalog(&["A"]);
    let mut transport = TransportState::new(80);
    transport.current = Some(0);
    transport.phase = Phase::Loading;

    let view = project(&catalog, &transport, reading(0, None));
    assert_eq!(view.rows[0].glyph, PAUSE_GLYPH);
    assert!(view.bar.playing);
}

#[test]
fn bar_shows_catalog_metadata_of_the_current_track() {
    let catalog = catalog(&["A", "B", "C"]);
    let mut transport = TransportState::new(65);
    transport.current = Some(0);
    transport.phase = Phase::Playing;

    let view = project(&catalog, &transport, reading(65, Some(200)));
    assert!(view.bar.visible);
    assert_eq!(view.bar.title, "A");
    assert_eq!(view.bar.artist, "A artist");
    assert_eq!(view.bar.artwork.as_deref(), Some("art/A.jpg"));
    assert_eq!(view.bar.volume, 65);
    assert_eq!(view.bar.elapsed, "1:05");
    assert_eq!(view.bar.total, "3:20");
    assert_eq!(view.bar.percent, 32.5);
}

#[test]
fn bar_is_hidden_while_idle() {
    let catalog = catalog(&["A"]);
    let transport = TransportState::new(100);

    let view = project(&catalog, &transport, reading(0, None));
    assert!(!view.bar.visible);
    assert!(view.rows.iter().all(|r| !r.active));
}

#[test]
fn unknown_duration_renders_zero_labels_not_nan() {
    let catalog = catalog(&["A"]);
    let mut transport = TransportState::new(100);
    transport.current = Some(0);
    transport.phase = Phase::Playing;

    // No backend duration yet: falls back to the probed catalog duration.
    let view = project(&catalog, &transport, reading(10, None));
    assert_eq!(view.bar.total, "3:20");

    // Entries without any duration at all:
    let bare = Catalog::new(
        vec![TrackDescriptor {
            index: 0,
            media: MediaRef::File(PathBuf::from("/tmp/x.mp3")),
            title: "X".into(),
            artist: "Y".into(),
            artwork: None,
            duration: None,
        }],
        BackendKind::Local,
    );
    let view = project(&bare, &transport, reading(10, None));
    assert_eq!(view.bar.total, "0:00");
    assert_eq!(view.bar.percent, 0.0);
}

#[test]
fn scrubbing_suppresses_backend_progress() {
    let catalog = catalog(&["A"]);
    let mut transport = TransportState::new(100);
    transport.current = Some(0);
    transport.phase = Phase::Playing;
    transport.scrubbing = true;
    transport.scrub_fraction = 0.25;

    // Backend says 150/200s; the drag position must win.
    let view = project(&catalog, &transport, reading(150, Some(200)));
    assert_eq!(view.bar.percent, 25.0);
    assert_eq!(view.bar.elapsed, "0:50");
}
