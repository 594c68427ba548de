//! Collaborator traits for Deck Player
//!
//! The playback core only talks to engines, history logs and playlists
//! through these traits. Implementations own their internal
//! synchronisation, so every method takes `&self`.

use crate::types::{PlaybackStatus, RepeatMode, SharedTrack};
use std::path::Path;

/// Playback engine (decode + render + transport status)
///
/// Engines usually run their own decode thread and publish
/// `EngineEvent`s from it. `state()` may report `PlaybackStatus::Error`.
pub trait PlaybackEngine: Send + Sync {
    /// Load and start playing a file
    ///
    /// Returns true if playback started
    fn play(&self, path: &Path) -> bool;

    /// Pause the current playback
    fn pause(&self);

    /// Resume playback if paused
    fn resume(&self);

    /// Stop playback and release the current file
    fn stop(&self);

    /// Seek to a position in seconds
    fn seek(&self, position_secs: f64);

    /// Set output volume (0.0 to 1.0)
    fn set_volume(&self, volume: f32);

    /// Current transport status
    fn state(&self) -> PlaybackStatus;

    /// Current playback position in seconds
    fn current_position(&self) -> f64;

    /// Duration of the current media in seconds
    fn duration(&self) -> f64;

    /// Whether the current file reached its end
    fn is_finished(&self) -> bool;
}

/// Append-only recently-played log
///
/// Fire-and-forget: failures stay inside the sink.
pub trait HistorySink: Send + Sync {
    /// Record that `track` started playing
    fn add_track(&self, track: SharedTrack);
}

/// Ordered, read-accessible track list with a repeat mode
///
/// This is the "current playlist" view the controller navigates.
pub trait TrackList: Send + Sync {
    /// Snapshot of the tracks in order
    fn tracks(&self) -> Vec<SharedTrack>;

    /// Playlist-scoped repeat mode
    fn repeat_mode(&self) -> RepeatMode;

    /// Change the playlist-scoped repeat mode
    fn set_repeat_mode(&self, mode: RepeatMode);

    /// Number of tracks
    fn len(&self) -> usize {
        self.tracks().len()
    }

    /// Whether the list is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the track stored at `path`
    fn position_of(&self, path: &Path) -> Option<usize> {
        self.tracks().iter().position(|track| track.is_at(path))
    }

    /// Whether the list loops (any repeat mode other than `None`)
    fn is_loop_enabled(&self) -> bool {
        self.repeat_mode().is_looping()
    }
}
