//! Hardware control events
//!
//! The hardware transport (serial/TCP framing, reconnects) lives outside the
//! core; only the decoded `{command, value}` contract is modelled here.

use serde::{Deserialize, Serialize};

/// Command emitted by an external control surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HardwareCommand {
    /// Resume playback
    Play,

    /// Pause playback
    Pause,

    /// Skip to the next track
    Next,

    /// Go to the previous track
    Previous,

    /// Volume knob / ADC update, value carries the level in `[0, 1]`
    VolumeChange,

    /// Legacy numeric button index (1 next, 2 previous, 3 play/pause)
    Button(u8),

    /// Anything the transport could not classify
    Unknown,
}

/// Ephemeral `{command, value}` pair; never persisted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HardwareEvent {
    /// What was pressed or turned
    pub command: HardwareCommand,

    /// Payload (volume level for `VolumeChange`, zero otherwise)
    pub value: f32,
}

impl HardwareEvent {
    /// Event without a payload
    pub fn new(command: HardwareCommand) -> Self {
        Self {
            command,
            value: 0.0,
        }
    }

    /// Volume knob event
    pub fn volume(level: f32) -> Self {
        Self {
            command: HardwareCommand::VolumeChange,
            value: level,
        }
    }

    /// Legacy numeric button event
    pub fn button(index: u8) -> Self {
        Self::new(HardwareCommand::Button(index))
    }
}

impl Default for HardwareEvent {
    fn default() -> Self {
        Self::new(HardwareCommand::Unknown)
    }
}
