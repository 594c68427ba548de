//! Domain types shared by every Deck Player crate

mod engine;
mod hardware;
mod playback;
mod track;

pub use engine::EngineEvent;
pub use hardware::{HardwareCommand, HardwareEvent};
pub use playback::{PlaybackStatus, RepeatMode};
pub use track::{SharedTrack, Track, TrackMetadata};
