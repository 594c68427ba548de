//! Error types for playback orchestration
//!
//! Steady-state controller operations report failure as `false`; these
//! errors only describe infrastructure problems around them.

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The playback service thread has shut down
    #[error("Playback service is not running")]
    ServiceStopped,

    /// The playback service thread panicked
    #[error("Playback service thread panicked")]
    Panicked,

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
