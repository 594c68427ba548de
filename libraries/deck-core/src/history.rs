//! Recently-played history
//!
//! Maintains a bounded, de-duplicated log of played tracks for history views

use crate::error::{CoreError, Result};
use crate::traits::HistorySink;
use crate::types::SharedTrack;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default number of remembered tracks
pub const DEFAULT_HISTORY_SIZE: usize = 50;

/// Playback history with bounded size
///
/// Most recent track first. Playing a track that is already in the history
/// moves it to the front instead of duplicating it; once the history is
/// full the oldest entries are discarded.
#[derive(Debug)]
pub struct History {
    inner: Mutex<HistoryInner>,
}

#[derive(Debug)]
struct HistoryInner {
    /// History buffer (most recent = front)
    tracks: VecDeque<SharedTrack>,

    /// Maximum history size
    max_size: usize,
}

impl History {
    /// Create new history with specified maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Mutex::new(HistoryInner {
                tracks: VecDeque::with_capacity(max_size),
                max_size,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HistoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Up to `count` most recent tracks (most recent first)
    pub fn recent(&self, count: usize) -> Vec<SharedTrack> {
        self.lock().tracks.iter().take(count).cloned().collect()
    }

    /// All tracks (most recent first)
    pub fn get_all(&self) -> Vec<SharedTrack> {
        self.lock().tracks.iter().cloned().collect()
    }

    /// Remove the entry at `index`
    pub fn remove_track(&self, index: usize) -> Result<SharedTrack> {
        let mut inner = self.lock();
        let len = inner.tracks.len();
        inner
            .tracks
            .remove(index)
            .ok_or(CoreError::IndexOutOfBounds { index, len })
    }

    /// Remove the entry for `path`, returning whether it was present
    pub fn remove_track_by_path(&self, path: &Path) -> bool {
        let mut inner = self.lock();
        match inner.tracks.iter().position(|t| t.is_at(path)) {
            Some(index) => {
                inner.tracks.remove(index);
                true
            }
            None => false,
        }
    }

    /// Get number of tracks in history
    pub fn len(&self) -> usize {
        self.lock().tracks.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.lock().tracks.is_empty()
    }

    /// Clear all history
    pub fn clear(&self) {
        self.lock().tracks.clear();
        tracing::info!("History cleared");
    }

    /// Get maximum history size
    pub fn max_size(&self) -> usize {
        self.lock().max_size
    }

    /// Set maximum history size
    ///
    /// If new size is smaller than current, oldest entries are discarded
    pub fn set_max_size(&self, max_size: usize) {
        let mut inner = self.lock();
        inner.max_size = max_size;
        inner.tracks.truncate(max_size);
    }
}

impl HistorySink for History {
    fn add_track(&self, track: SharedTrack) {
        let mut inner = self.lock();

        if let Some(existing) = inner.tracks.iter().position(|t| t.same_path(&track)) {
            inner.tracks.remove(existing);
        }

        tracing::debug!(path = %track.path.display(), "Added to history");
        inner.tracks.push_front(track);

        let max_size = inner.max_size;
        inner.tracks.truncate(max_size);
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}
