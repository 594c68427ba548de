//! Playback status and repeat mode

use serde::{Deserialize, Serialize};

/// Transport status
///
/// `Error` is only ever reported by a playback engine; the playback state
/// holder stores one of the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// Nothing playing
    #[default]
    Stopped,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,

    /// The engine failed to load or decode the current file
    Error,
}

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when the list ends
    #[default]
    None,

    /// Loop the current track
    One,

    /// Loop the entire list
    All,
}

impl RepeatMode {
    /// Next mode in the toggle cycle: `None -> One -> All -> None`
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::None => RepeatMode::One,
            RepeatMode::One => RepeatMode::All,
            RepeatMode::All => RepeatMode::None,
        }
    }

    /// Whether any looping is enabled
    pub fn is_looping(self) -> bool {
        self != RepeatMode::None
    }
}
