//! Named, ordered playlist with a playlist-scoped repeat mode

use crate::error::{CoreError, Result};
use crate::traits::TrackList;
use crate::types::{RepeatMode, SharedTrack};
use rand::seq::SliceRandom;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Ordered track list
///
/// Paths are unique within a playlist. All access goes through one internal
/// lock so a playlist can be shared with the playback controller while a
/// view edits it.
#[derive(Debug)]
pub struct Playlist {
    inner: Mutex<PlaylistInner>,
}

#[derive(Debug)]
struct PlaylistInner {
    name: String,
    tracks: Vec<SharedTrack>,
    repeat_mode: RepeatMode,
}

impl Playlist {
    /// Create an empty playlist
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(PlaylistInner {
                name: name.into(),
                tracks: Vec::new(),
                repeat_mode: RepeatMode::None,
            }),
        }
    }

    /// Create a playlist from tracks, dropping duplicate paths
    pub fn with_tracks(name: impl Into<String>, tracks: Vec<SharedTrack>) -> Self {
        let playlist = Self::new(name);
        for track in tracks {
            playlist.add_track(track).ok();
        }
        playlist
    }

    fn lock(&self) -> MutexGuard<'_, PlaylistInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Playlist name
    pub fn name(&self) -> String {
        self.lock().name.clone()
    }

    /// Rename the playlist
    pub fn rename(&self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::invalid_input("playlist name cannot be empty"));
        }
        self.lock().name = name;
        Ok(())
    }

    /// Append a track
    pub fn add_track(&self, track: SharedTrack) -> Result<()> {
        let mut inner = self.lock();

        if inner.tracks.iter().any(|t| t.same_path(&track)) {
            tracing::warn!(
                playlist = %inner.name,
                path = %track.path.display(),
                "Track already exists in playlist"
            );
            return Err(CoreError::Duplicate(track.path.display().to_string()));
        }

        tracing::debug!(playlist = %inner.name, path = %track.path.display(), "Added track");
        inner.tracks.push(track);
        Ok(())
    }

    /// Insert a track at `position` (`position == len` appends)
    pub fn insert_track(&self, track: SharedTrack, position: usize) -> Result<()> {
        let mut inner = self.lock();
        let len = inner.tracks.len();

        if position > len {
            return Err(CoreError::IndexOutOfBounds {
                index: position,
                len,
            });
        }
        if inner.tracks.iter().any(|t| t.same_path(&track)) {
            return Err(CoreError::Duplicate(track.path.display().to_string()));
        }

        inner.tracks.insert(position, track);
        Ok(())
    }

    /// Remove the track at `index`
    pub fn remove_track(&self, index: usize) -> Result<SharedTrack> {
        let mut inner = self.lock();
        let len = inner.tracks.len();

        if index >= len {
            return Err(CoreError::IndexOutOfBounds { index, len });
        }
        Ok(inner.tracks.remove(index))
    }

    /// Remove the track stored at `path`
    pub fn remove_track_by_path(&self, path: &Path) -> Result<SharedTrack> {
        let mut inner = self.lock();
        let index = inner
            .tracks
            .iter()
            .position(|t| t.is_at(path))
            .ok_or_else(|| CoreError::not_found("Track", path.display().to_string()))?;
        Ok(inner.tracks.remove(index))
    }

    /// Track at `index`
    pub fn get(&self, index: usize) -> Option<SharedTrack> {
        self.lock().tracks.get(index).cloned()
    }

    /// Whether a track with `path` is in the playlist
    pub fn contains(&self, path: &Path) -> bool {
        self.lock().tracks.iter().any(|t| t.is_at(path))
    }

    /// Remove all tracks
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.tracks.clear();
        tracing::info!(playlist = %inner.name, "Cleared playlist");
    }

    /// Shuffle the track order in place
    pub fn shuffle(&self) {
        let mut inner = self.lock();
        if inner.tracks.len() <= 1 {
            return;
        }
        inner.tracks.shuffle(&mut rand::thread_rng());
        tracing::info!(playlist = %inner.name, "Shuffled playlist");
    }
}

impl TrackList for Playlist {
    fn tracks(&self) -> Vec<SharedTrack> {
        self.lock().tracks.clone()
    }

    fn repeat_mode(&self) -> RepeatMode {
        self.lock().repeat_mode
    }

    fn set_repeat_mode(&self, mode: RepeatMode) {
        self.lock().repeat_mode = mode;
    }

    fn len(&self) -> usize {
        self.lock().tracks.len()
    }

    fn position_of(&self, path: &Path) -> Option<usize> {
        self.lock().tracks.iter().position(|t| t.is_at(path))
    }
}
