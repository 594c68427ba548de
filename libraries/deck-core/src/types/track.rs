//! Track reference and display metadata

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Shared track handle.
///
/// A single track is referenced at once by the library, playlists, the
/// history, the back-stack and the play queue; it lives as long as its
/// longest holder.
pub type SharedTrack = Arc<Track>;

/// Display metadata for a track
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackMetadata {
    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Album name (optional)
    pub album: Option<String>,

    /// Track duration (zero when unknown)
    pub duration: Duration,
}

/// A media item identified by its filesystem path
///
/// The path is the identity key: two tracks with the same path are the same
/// track for navigation, history and back-stack purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// File path, unique within a collection
    pub path: PathBuf,

    /// Display metadata
    pub metadata: TrackMetadata,
}

impl Track {
    /// Create a track with metadata derived from the path.
    ///
    /// The title is the file stem, the duration is unknown (zero).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let title = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            path,
            metadata: TrackMetadata {
                title,
                ..TrackMetadata::default()
            },
        }
    }

    /// Create a track with explicit metadata
    pub fn with_metadata(path: impl Into<PathBuf>, metadata: TrackMetadata) -> Self {
        Self {
            path: path.into(),
            metadata,
        }
    }

    /// Whether `other` refers to the same file
    pub fn same_path(&self, other: &Track) -> bool {
        self.path == other.path
    }

    /// Whether this track lives at `path`
    pub fn is_at(&self, path: &Path) -> bool {
        self.path == path
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.metadata.duration.as_secs_f64()
    }

    /// "Artist - Title", or just the title when the artist is unknown
    pub fn display_name(&self) -> String {
        if self.metadata.artist.is_empty() {
            self.metadata.title.clone()
        } else {
            format!("{} - {}", self.metadata.artist, self.metadata.title)
        }
    }
}
