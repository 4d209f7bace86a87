//! Catalog model types: `TrackDescriptor`, `MediaRef` and the read-only
//! `Catalog` built once at startup.

use std::path::PathBuf;
use std::time::Duration;

use crate::player::PlayerError;

/// What a track points at. The catalog is mono-variant: every entry is a
/// local file or every entry is a remote URI, never a mix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaRef {
    /// A local audio file played through rodio.
    File(PathBuf),
    /// A URI in the remote daemon's database.
    Remote(String),
}

/// Which backend variant a catalog requires. Decided once at load time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BackendKind {
    Local,
    Remote,
}

/// One playlist entry. Immutable after the manifest is read.
#[derive(Debug, Clone)]
pub struct TrackDescriptor {
    /// Ordinal position in the manifest; defines next/previous order.
    pub index: usize,
    pub media: MediaRef,
    pub title: String,
    pub artist: String,
    /// Artwork reference (path or URL), surfaced verbatim in the player bar
    /// and MPRIS metadata.
    pub artwork: Option<String>,
    /// Probed media duration for local files; `None` for remote entries
    /// (the daemon reports it at playback time) or when probing failed.
    pub duration: Option<Duration>,
}

/// Fixed, ordered list of playable entries. No mutation API.
#[derive(Debug, Clone)]
pub struct Catalog {
    tracks: Vec<TrackDescriptor>,
    kind: BackendKind,
}

impl Catalog {
    pub(crate) fn new(tracks: Vec<TrackDescriptor>, kind: BackendKind) -> Self {
        Self { tracks, kind }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&TrackDescriptor, PlayerError> {
        self.tracks.get(index).ok_or(PlayerError::InvalidIndex {
            index,
            len: self.tracks.len(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackDescriptor> {
        self.tracks.iter()
    }

    /// The backend variant this catalog requires.
    pub fn backend_kind(&self) -> BackendKind {
        self.kind
    }
}
