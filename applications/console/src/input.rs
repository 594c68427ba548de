//! Stdin control surface
//!
//! Each line typed on the terminal plays the part of a hardware button
//! press. Events are published on the hardware bus from the listener
//! thread, exactly like a serial or GPIO listener would.

use crossbeam_channel::Sender;
use deck_core::{HardwareCommand, HardwareEvent};
use deck_playback::{EventBus, PlaybackHandle, PlaybackSnapshot, PlaybackState};
use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::warn;

/// One parsed console line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleInput {
    /// Forwarded to the hardware bus
    Hardware(HardwareEvent),
    ToggleRepeat,
    Status,
    Quit,
}

/// Parse a console line; `None` for blank or unknown input
pub fn parse_line(line: &str) -> Option<ConsoleInput> {
    let mut words = line.split_whitespace();
    let command = words.next()?.to_ascii_lowercase();
    let argument = words.next();

    let input = match command.as_str() {
        "next" | "n" => ConsoleInput::Hardware(HardwareEvent::new(HardwareCommand::Next)),
        "prev" | "previous" | "p" => {
            ConsoleInput::Hardware(HardwareEvent::new(HardwareCommand::Previous))
        }
        "play" => ConsoleInput::Hardware(HardwareEvent::new(HardwareCommand::Play)),
        "pause" => ConsoleInput::Hardware(HardwareEvent::new(HardwareCommand::Pause)),
        "vol" | "volume" => {
            let level = argument?.parse::<f32>().ok()?;
            ConsoleInput::Hardware(HardwareEvent::volume(level))
        }
        "btn" | "button" => {
            let index = argument?.parse::<u8>().ok()?;
            ConsoleInput::Hardware(HardwareEvent::button(index))
        }
        "repeat" | "r" => ConsoleInput::ToggleRepeat,
        "status" | "s" => ConsoleInput::Status,
        "quit" | "q" | "exit" => ConsoleInput::Quit,
        _ => return None,
    };

    Some(input)
}

/// Start the stdin listener thread
///
/// `quit_tx` fires on `quit`, on end of input and when the playback
/// service is gone.
pub fn spawn_listener(
    hardware: Arc<EventBus<HardwareEvent>>,
    handle: PlaybackHandle,
    state: Arc<PlaybackState>,
    quit_tx: Sender<()>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("deck-stdin".into())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };

                match parse_line(&line) {
                    Some(ConsoleInput::Hardware(event)) => hardware.notify(&event),
                    Some(ConsoleInput::ToggleRepeat) => {
                        if handle.toggle_repeat_mode().is_err() {
                            break;
                        }
                    }
                    Some(ConsoleInput::Status) => println!("{}", format_status(&state.snapshot())),
                    Some(ConsoleInput::Quit) => break,
                    None if line.trim().is_empty() => {}
                    None => warn!(line = %line.trim(), "Unknown command"),
                }
            }

            quit_tx.send(()).ok();
        })
}

/// One-line status summary
pub fn format_status(snapshot: &PlaybackSnapshot) -> String {
    let track = snapshot
        .track
        .as_ref()
        .map_or_else(|| "-".to_string(), |track| track.display_name());

    format!(
        "[{:?}] {} {:.1}/{:.1}s vol {:.0}% queue {}/{} back {}",
        snapshot.status,
        track,
        snapshot.position,
        snapshot.duration,
        snapshot.volume * 100.0,
        snapshot.queue_index,
        snapshot.queue_len,
        snapshot.back_stack_len,
    )
}
