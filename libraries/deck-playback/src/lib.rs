//! Deck Player - Playback Orchestration
//!
//! Keeps playback correct while it is driven by three independent stimuli:
//! the per-frame UI tick, asynchronous engine notifications and an external
//! hardware control surface running on its own thread.
//!
//! This crate provides:
//! - `EventBus`: typed many-to-many publish/subscribe used by every model
//! - `PlaybackState`: the locked single source of truth (track, status,
//!   volume, position, back-stack, play queue)
//! - `PlaybackController`: navigation, repeat modes, duplicate-trigger
//!   throttling and engine failure reporting
//! - `PlaybackService`: runs the controller as a single-writer actor that
//!   drains a command mailbox and an event channel, so hardware and engine
//!   threads never call into it
//! - `PlayerConfig`: file + environment configuration
//!
//! # Example: Queue navigation
//!
//! ```rust
//! use deck_core::{PlaybackEngine, PlaybackStatus, Track};
//! use deck_playback::{PlaybackController, PlaybackState};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! struct SilentEngine;
//!
//! impl PlaybackEngine for SilentEngine {
//!     fn play(&self, _path: &Path) -> bool { true }
//!     fn pause(&self) {}
//!     fn resume(&self) {}
//!     fn stop(&self) {}
//!     fn seek(&self, _position_secs: f64) {}
//!     fn set_volume(&self, _volume: f32) {}
//!     fn state(&self) -> PlaybackStatus { PlaybackStatus::Playing }
//!     fn current_position(&self) -> f64 { 0.0 }
//!     fn duration(&self) -> f64 { 0.0 }
//!     fn is_finished(&self) -> bool { false }
//! }
//!
//! let state = Arc::new(PlaybackState::default());
//! let mut controller = PlaybackController::new(state.clone(), Arc::new(SilentEngine));
//!
//! let tracks: Vec<_> = ["/music/a.mp3", "/music/b.mp3"]
//!     .into_iter()
//!     .map(|p| Arc::new(Track::new(p)))
//!     .collect();
//!
//! assert!(controller.play_context(tracks, 0));
//! assert!(controller.next());
//! assert_eq!(state.current_track().unwrap().path, Path::new("/music/b.mp3"));
//! assert!(!controller.next());
//! ```
//!
//! # Example: Actor
//!
//! ```rust,no_run
//! use deck_playback::{PlaybackController, PlaybackService, ServiceSettings};
//! # fn build() -> PlaybackController { unimplemented!() }
//!
//! let service = PlaybackService::spawn(build(), &ServiceSettings::default()).unwrap();
//! let handle = service.handle();
//!
//! // UI thread, every frame
//! handle.tick(1.0 / 60.0).ok();
//!
//! // Anywhere
//! handle.next().ok();
//! service.shutdown().ok();
//! ```

mod bus;
mod clock;
mod config;
mod controller;
mod error;
mod service;
mod state;

// Public exports
pub use bus::{ChannelSubscriber, EventBus, Subscriber};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{HistorySettings, PlaybackSettings, PlayerConfig, ServiceSettings};
pub use controller::{ControllerSettings, PlaybackController, TrackLoadFailedCallback};
pub use error::{PlaybackError, Result};
pub use service::{PlaybackCommand, PlaybackEvent, PlaybackHandle, PlaybackService, Reply};
pub use state::{PlaybackSnapshot, PlaybackState, StateEvent, DEFAULT_VOLUME};
