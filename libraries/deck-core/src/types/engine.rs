//! Events published by a playback engine

use super::playback::PlaybackStatus;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Engine notification
///
/// Engines publish these from their own threads; consumers must not assume
/// they arrive on the UI thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// The engine entered `PlaybackStatus::Error`
    Error {
        /// File that failed, when the engine knows it
        path: Option<PathBuf>,
        /// Engine-provided description
        message: String,
    },

    /// End of stream reached for the current file
    Finished,

    /// Transport status changed inside the engine
    StatusChanged(PlaybackStatus),
}

impl EngineEvent {
    /// Error event with a message
    pub fn error(path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self::Error {
            path,
            message: message.into(),
        }
    }

    /// Whether this event reports the error condition
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            EngineEvent::Error { .. } | EngineEvent::StatusChanged(PlaybackStatus::Error)
        )
    }
}
