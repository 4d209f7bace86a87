//! Playlist manifest loading.
//!
//! The manifest is a TOML file with one `[[track]]` table per entry, read
//! once at startup. Entries carry a title, an artist name, optional artwork
//! and exactly one media reference: `file = "…"` (local audio) or
//! `uri = "…"` (remote daemon database path).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::model::{BackendKind, Catalog, MediaRef, TrackDescriptor};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read playlist {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse playlist {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// An entry has neither `file` nor `uri`, or both.
    #[error("track {index} ({title:?}) must have exactly one of `file` or `uri`")]
    AmbiguousMediaRef { index: usize, title: String },

    /// The backend is chosen once from the catalog shape, so local files and
    /// remote URIs cannot share a playlist.
    #[error("playlist mixes local files and remote URIs; pick one kind")]
    MixedMediaKinds,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default, rename = "track")]
    tracks: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    title: String,
    artist: String,
    #[serde(default)]
    artwork: Option<String>,
    #[serde(default)]
    file: Option<PathBuf>,
    #[serde(default)]
    uri: Option<String>,
}

/// Load and validate a playlist manifest.
pub fn load(path: &Path) -> Result<Catalog, CatalogError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let manifest: Manifest = toml::from_str(&raw).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    // Relative file paths resolve against the manifest's directory.
    let base = path.parent().unwrap_or(Path::new("."));
    build(manifest, base)
}

fn build(manifest: Manifest, base: &Path) -> Result<Catalog, CatalogError> {
    let mut tracks: Vec<TrackDescriptor> = Vec::with_capacity(manifest.tracks.len());

    for (index, entry) in manifest.tracks.into_iter().enumerate() {
        let media = match (entry.file, entry.uri) {
            (Some(file), None) => {
                let file = if file.is_absolute() {
                    file
                } else {
                    base.join(file)
                };
                MediaRef::File(file)
            }
            (None, Some(uri)) => MediaRef::Remote(uri),
            _ => {
                return Err(CatalogError::AmbiguousMediaRef {
                    index,
                    title: entry.title,
                });
            }
        };

        let duration = match &media {
            MediaRef::File(path) => probe_duration(path),
            MediaRef::Remote(_) => None,
        };

        tracks.push(TrackDescriptor {
            index,
            media,
            title: entry.title,
            artist: entry.artist,
            artwork: entry.artwork,
            duration,
        });
    }

    let kind = backend_kind_of(&tracks)?;
    debug!(tracks = tracks.len(), ?kind, "catalog loaded");
    Ok(Catalog::new(tracks, kind))
}

fn backend_kind_of(tracks: &[TrackDescriptor]) -> Result<BackendKind, CatalogError> {
    let mut kind: Option<BackendKind> = None;
    for track in tracks {
        let this = match track.media {
            MediaRef::File(_) => BackendKind::Local,
            MediaRef::Remote(_) => BackendKind::Remote,
        };
        match kind {
            None => kind = Some(this),
            Some(k) if k != this => return Err(CatalogError::MixedMediaKinds),
            Some(_) => {}
        }
    }
    // An empty playlist renders an empty list and an Idle player; default to
    // the local backend so startup still succeeds.
    Ok(kind.unwrap_or(BackendKind::Local))
}

/// Best-effort duration probe for a local file. Failures are fine: the player
/// renders "0:00" for unknown durations instead of erroring.
fn probe_duration(path: &Path) -> Option<Duration> {
    use lofty::prelude::AudioFile;

    match lofty::read_from_path(path) {
        Ok(tagged) => Some(tagged.properties().duration()),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "duration probe failed");
            None
        }
    }
}
