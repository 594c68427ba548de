//! Deck Player Core
//!
//! Platform-agnostic core types, collaborator traits and track models.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `PlaybackStatus`, `RepeatMode`, `HardwareEvent`, `EngineEvent`
//! - **Collaborator Traits**: `PlaybackEngine`, `HistorySink`, `TrackList`
//! - **Models**: `Playlist` (ordered, repeat-aware) and `History` (bounded recent tracks)
//! - **Error Handling**: `CoreError` and `Result`
//!
//! Tracks are shared through `Arc` (`SharedTrack`): the library, a playlist,
//! the history and the playback queues can all hold the same track.
//!
//! # Example
//!
//! ```rust
//! use deck_core::{History, HistorySink, Playlist, Track, TrackList};
//! use std::sync::Arc;
//!
//! let track = Arc::new(Track::new("/music/song.mp3"));
//!
//! let playlist = Playlist::new("Favorites");
//! playlist.add_track(track.clone()).unwrap();
//! assert_eq!(playlist.position_of(&track.path), Some(0));
//!
//! let history = History::new(50);
//! history.add_track(track);
//! assert_eq!(history.len(), 1);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod history;
pub mod playlist;
pub mod traits;
pub mod types;

pub use error::{CoreError, Result};
pub use history::History;
pub use playlist::Playlist;
pub use traits::{HistorySink, PlaybackEngine, TrackList};
pub use types::{
    EngineEvent, HardwareCommand, HardwareEvent, PlaybackStatus, RepeatMode, SharedTrack, Track,
    TrackMetadata,
};
