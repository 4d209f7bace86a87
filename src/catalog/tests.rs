use std::fs;

use tempfile::tempdir;

use super::load::{CatalogError, load};
use super::model::{BackendKind, MediaRef};
use crate::player::PlayerError;

fn write_playlist(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("playlist.toml");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn load_builds_ordered_local_catalog() {
    let (dir, path) = write_playlist(
        r#"
        [[track]]
        title = "Midnight Run"
        artist = "Nova Arcade"
        artwork = "art/nova.jpg"
        file = "music/midnight-run.mp3"

        [[track]]
        title = "Glass Tides"
        artist = "Mara Vell"
        file = "music/glass-tides.ogg"
        "#,
    );

    let catalog = load(&path).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.backend_kind(), BackendKind::Local);

    let first = catalog.get(0).unwrap();
    assert_eq!(first.index, 0);
    assert_eq!(first.title, "Midnight Run");
    assert_eq!(first.artist, "Nova Arcade");
    assert_eq!(first.artwork.as_deref(), Some("art/nova.jpg"));
    // Relative paths resolve against the manifest directory.
    assert_eq!(
        first.media,
        MediaRef::File(dir.path().join("music/midnight-run.mp3"))
    );
    // The file does not exist, so the probe yields no duration.
    assert_eq!(first.duration, None);

    assert_eq!(catalog.get(1).unwrap().title, "Glass Tides");
}

#[test]
fn load_builds_remote_catalog_from_uris() {
    let (_dir, path) = write_playlist(
        r#"
        [[track]]
        title = "Live Set"
        artist = "Nova Arcade"
        uri = "sessions/live-set.flac"
        "#,
    );

    let catalog = load(&path).unwrap();
    assert_eq!(catalog.backend_kind(), BackendKind::Remote);
    assert_eq!(
        catalog.get(0).unwrap().media,
        MediaRef::Remote("sessions/live-set.flac".to_string())
    );
}

#[test]
fn load_rejects_mixed_media_kinds() {
    let (_dir, path) = write_playlist(
        r#"
        [[track]]
        title = "A"
        artist = "X"
        file = "a.mp3"

        [[track]]
        title = "B"
        artist = "Y"
        uri = "b.flac"
        "#,
    );

    assert!(matches!(load(&path), Err(CatalogError::MixedMediaKinds)));
}

#[test]
fn load_rejects_entries_without_exactly_one_media_ref() {
    let (_dir, path) = write_playlist(
        r#"
        [[track]]
        title = "No Ref"
        artist = "X"
        "#,
    );
    assert!(matches!(
        load(&path),
        Err(CatalogError::AmbiguousMediaRef { index: 0, .. })
    ));

    let (_dir, path) = write_playlist(
        r#"
        [[track]]
        title = "Both Refs"
        artist = "X"
        file = "a.mp3"
        uri = "a.flac"
        "#,
    );
    assert!(matches!(
        load(&path),
        Err(CatalogError::AmbiguousMediaRef { index: 0, .. })
    ));
}

#[test]
fn empty_playlist_is_allowed() {
    let (_dir, path) = write_playlist("");
    let catalog = load(&path).unwrap();
    assert!(catalog.is_empty());
    assert_eq!(catalog.backend_kind(), BackendKind::Local);
}

#[test]
fn get_out_of_range_is_invalid_index() {
    let (_dir, path) = write_playlist(
        r#"
        [[track]]
        title = "Only"
        artist = "X"
        file = "only.mp3"
        "#,
    );
    let catalog = load(&path).unwrap();
    assert!(matches!(
        catalog.get(1),
        Err(PlayerError::InvalidIndex { index: 1, len: 1 })
    ));
}
