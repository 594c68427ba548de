//! Player configuration (TOML file + `DECK_` environment variables)

use crate::error::{PlaybackError, Result};
use crate::state::DEFAULT_VOLUME;
use deck_core::RepeatMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default)]
    pub playback: PlaybackSettings,

    #[serde(default)]
    pub history: HistorySettings,

    #[serde(default)]
    pub service: ServiceSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_volume")]
    pub default_volume: f32,

    /// Global repeat mode used outside playlist mode
    #[serde(default)]
    pub repeat: RepeatMode,

    /// Duplicate `play` requests for the same path inside this window collapse
    #[serde(default = "default_throttle_window_ms")]
    pub throttle_window_ms: u64,

    /// "Previous" past this position restarts the current track instead
    #[serde(default = "default_restart_threshold_secs")]
    pub restart_threshold_secs: f64,

    /// Slack past the duration before completion is assumed without the engine
    #[serde(default = "default_finish_grace_secs")]
    pub finish_grace_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HistorySettings {
    #[serde(default = "default_history_size")]
    pub max_size: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServiceSettings {
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,

    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl PlayerConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// Environment variables use the `DECK_` prefix and `__` between
    /// section and key, e.g. `DECK_PLAYBACK__DEFAULT_VOLUME=0.5`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        // Load from config file if it exists
        if let Some(path) = path {
            if !path.exists() {
                return Err(PlaybackError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            settings = settings.add_source(config::File::from(path.to_path_buf()));
        }

        // Override with environment variables (prefixed with DECK_)
        settings = settings.add_source(
            config::Environment::with_prefix("DECK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings
            .build()
            .map_err(|e| PlaybackError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PlaybackError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.playback.default_volume) {
            return Err(PlaybackError::Config(format!(
                "default_volume must be within 0.0..=1.0, got {}",
                self.playback.default_volume
            )));
        }

        if self.playback.restart_threshold_secs < 0.0 || self.playback.finish_grace_secs < 0.0 {
            return Err(PlaybackError::Config(
                "restart_threshold_secs and finish_grace_secs cannot be negative".to_string(),
            ));
        }

        if self.history.max_size == 0 {
            return Err(PlaybackError::Config(
                "history.max_size must be at least 1".to_string(),
            ));
        }

        if self.service.mailbox_capacity == 0 {
            return Err(PlaybackError::Config(
                "service.mailbox_capacity must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Write the configuration as TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| PlaybackError::Config(e.to_string()))?;
        std::fs::write(path, contents)?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            default_volume: default_volume(),
            repeat: RepeatMode::None,
            throttle_window_ms: default_throttle_window_ms(),
            restart_threshold_secs: default_restart_threshold_secs(),
            finish_grace_secs: default_finish_grace_secs(),
        }
    }
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_size: default_history_size(),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            mailbox_capacity: default_mailbox_capacity(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

// Default values
fn default_volume() -> f32 {
    DEFAULT_VOLUME
}

fn default_throttle_window_ms() -> u64 {
    500
}

fn default_restart_threshold_secs() -> f64 {
    3.0
}

fn default_finish_grace_secs() -> f64 {
    1.0
}

fn default_history_size() -> usize {
    deck_core::history::DEFAULT_HISTORY_SIZE
}

fn default_mailbox_capacity() -> usize {
    64
}

fn default_tick_interval_ms() -> u64 {
    16
}
