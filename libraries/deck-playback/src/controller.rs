//! Playback controller - core orchestration
//!
//! Turns UI commands, hardware events, engine notifications and timer ticks
//! into `PlaybackState` transitions and engine calls. Implements navigation
//! over two topologies (repeat-aware playlist, ad-hoc queue with a LIFO
//! back-stack), duplicate-trigger throttling and engine failure reporting.
//!
//! Every entry point takes `&mut self`: the controller is a single writer.
//! When several threads need to drive it, run it inside a
//! [`PlaybackService`](crate::PlaybackService) instead of sharing it.

use crate::clock::{Clock, SystemClock};
use crate::config::PlaybackSettings;
use crate::state::PlaybackState;
use deck_core::{
    EngineEvent, HardwareCommand, HardwareEvent, HistorySink, PlaybackEngine, PlaybackStatus,
    RepeatMode, SharedTrack, TrackList,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Invoked with the path of the track the engine failed to play
pub type TrackLoadFailedCallback = Box<dyn FnMut(&Path) + Send>;

/// Controller tunables
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSettings {
    /// Repeated `play` of the same path inside this window is collapsed
    pub throttle_window: Duration,

    /// In playlist mode, "previous" past this position restarts the track
    pub restart_threshold_secs: f64,

    /// Position past `duration + finish_grace_secs` counts as finished
    pub finish_grace_secs: f64,

    /// Repeat mode used when no playlist is active
    pub repeat: RepeatMode,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&PlaybackSettings::default())
    }
}

impl From<&PlaybackSettings> for ControllerSettings {
    fn from(settings: &PlaybackSettings) -> Self {
        Self {
            throttle_window: Duration::from_millis(settings.throttle_window_ms),
            restart_threshold_secs: settings.restart_threshold_secs,
            finish_grace_secs: settings.finish_grace_secs,
            repeat: settings.repeat,
        }
    }
}

/// Last accepted `play` request
#[derive(Debug, Clone)]
struct ThrottleWindow {
    path: PathBuf,
    started_at: Instant,
    result: bool,
}

/// Central playback orchestration
///
/// Engine, history and playlist are shared with the assembler through `Arc`
/// and only invoked through their trait operations.
pub struct PlaybackController {
    state: Arc<PlaybackState>,
    engine: Arc<dyn PlaybackEngine>,
    history: Option<Arc<dyn HistorySink>>,
    current_playlist: Option<Arc<dyn TrackList>>,
    global_repeat: RepeatMode,
    settings: ControllerSettings,
    clock: Arc<dyn Clock>,

    throttle: Option<ThrottleWindow>,
    last_attempted_path: Option<PathBuf>,
    // One failure report per play attempt
    load_failure_reported: bool,
    on_track_load_failed: Option<TrackLoadFailedCallback>,

    // Seconds accumulated past the end of the track (position is clamped)
    overrun: f64,
    // Cleared once a completion has been handled, re-armed by play/seek/resume
    completion_armed: bool,
}

impl PlaybackController {
    /// Create a controller in queue mode with default settings
    pub fn new(state: Arc<PlaybackState>, engine: Arc<dyn PlaybackEngine>) -> Self {
        let settings = ControllerSettings::default();
        Self {
            state,
            engine,
            history: None,
            current_playlist: None,
            global_repeat: settings.repeat,
            settings,
            clock: Arc::new(SystemClock),
            throttle: None,
            last_attempted_path: None,
            load_failure_reported: false,
            on_track_load_failed: None,
            overrun: 0.0,
            completion_armed: false,
        }
    }

    /// Record every started track in `history`
    pub fn with_history(mut self, history: Arc<dyn HistorySink>) -> Self {
        self.history = Some(history);
        self
    }

    /// Start in playlist mode
    pub fn with_playlist(mut self, playlist: Arc<dyn TrackList>) -> Self {
        self.set_current_playlist(Some(playlist));
        self
    }

    /// Override the tunables (also resets the global repeat mode)
    pub fn with_settings(mut self, settings: ControllerSettings) -> Self {
        self.global_repeat = settings.repeat;
        self.settings = settings;
        self
    }

    /// Use another time source for the throttle window
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register the outward failure callback
    pub fn set_on_track_load_failed(&mut self, callback: impl FnMut(&Path) + Send + 'static) {
        self.on_track_load_failed = Some(Box::new(callback));
    }

    // ===== Accessors =====

    pub fn state(&self) -> &Arc<PlaybackState> {
        &self.state
    }

    pub fn engine(&self) -> &Arc<dyn PlaybackEngine> {
        &self.engine
    }

    pub fn current_playlist(&self) -> Option<&Arc<dyn TrackList>> {
        self.current_playlist.as_ref()
    }

    /// Path of the last track handed to the engine
    pub fn last_attempted_path(&self) -> Option<&Path> {
        self.last_attempted_path.as_deref()
    }

    /// Whether the engine reports the current file as finished
    pub fn has_finished(&self) -> bool {
        self.engine.is_finished()
    }

    // ===== Transport =====

    /// Play `track`, pushing the current track onto the back-stack
    pub fn play(&mut self, track: SharedTrack) -> bool {
        self.play_with(track, true)
    }

    /// Play `track`
    ///
    /// A second request for the same path inside the throttle window is
    /// collapsed: it returns the first request's result without touching
    /// the engine, the history or the state.
    pub fn play_with(&mut self, track: SharedTrack, push_to_stack: bool) -> bool {
        let now = self.clock.now();

        if let Some(window) = &self.throttle {
            if window.path == track.path
                && now.saturating_duration_since(window.started_at) < self.settings.throttle_window
            {
                debug!(path = %track.path.display(), "Duplicate play request collapsed");
                return window.result;
            }
        }

        self.throttle = Some(ThrottleWindow {
            path: track.path.clone(),
            started_at: now,
            result: true,
        });

        if push_to_stack && self.state.current_track().is_some() {
            self.state.push_to_back_stack();
        }

        // Optimistic: status says Playing before the engine confirms
        self.state
            .set_playback(Some(track.clone()), PlaybackStatus::Playing);
        self.state.sync_queue_index(&track);

        if let Some(history) = &self.history {
            history.add_track(track.clone());
        }

        self.last_attempted_path = Some(track.path.clone());
        self.load_failure_reported = false;
        self.overrun = 0.0;
        self.completion_armed = true;

        let started = self.engine.play(&track.path);
        if let Some(window) = self.throttle.as_mut() {
            window.result = started;
        }

        if started {
            info!(track = %track.display_name(), "Playing");
        } else {
            warn!(path = %track.path.display(), "Engine refused to play track");
        }
        started
    }

    pub fn pause(&mut self) {
        if self.state.current_track().is_none() {
            return;
        }
        self.engine.pause();
        self.state.set_status(PlaybackStatus::Paused);
    }

    pub fn resume(&mut self) {
        if self.state.current_track().is_none() {
            return;
        }
        self.engine.resume();
        self.completion_armed = true;
        self.state.set_status(PlaybackStatus::Playing);
    }

    /// Stop playback and rewind; the current track is kept
    pub fn stop(&mut self) {
        self.engine.stop();
        self.overrun = 0.0;
        self.state.set_status(PlaybackStatus::Stopped);
        self.state.set_position(0.0);
    }

    /// Seek the engine and the state to `position_secs`
    pub fn seek(&mut self, position_secs: f64) {
        let position_secs = position_secs.max(0.0);
        self.engine.seek(position_secs);
        self.state.set_position(position_secs);
        self.overrun = 0.0;
        self.completion_armed = true;
    }

    /// Set the volume on the state and the engine (clamped to `[0, 1]`)
    pub fn set_volume(&mut self, volume: f32) {
        self.state.set_volume(volume);
        self.engine.set_volume(self.state.volume());
    }

    // ===== Navigation =====

    /// Advance to the next track
    ///
    /// Playlist mode follows the playlist order (wrapping only with
    /// `RepeatMode::All`); queue mode pulls from the state's queue cursor
    /// (wrapping once with the global `RepeatMode::All`). Returns whether a
    /// new track began playing.
    pub fn next(&mut self) -> bool {
        match self.current_playlist.clone() {
            Some(playlist) => self.next_in_playlist(playlist.as_ref()),
            None => self.next_in_queue(),
        }
    }

    fn next_in_playlist(&mut self, playlist: &dyn TrackList) -> bool {
        let tracks = playlist.tracks();
        if tracks.is_empty() {
            debug!("Next: playlist is empty");
            return false;
        }

        let current = self
            .state
            .current_track()
            .and_then(|current| tracks.iter().position(|t| t.same_path(&current)));

        let target = match current {
            Some(index) if index + 1 < tracks.len() => index + 1,
            Some(_) if playlist.repeat_mode() == RepeatMode::All => {
                debug!("Next: wrapping playlist");
                0
            }
            Some(_) => {
                debug!("Next: end of playlist");
                return false;
            }
            // Current track left the playlist; restart from the top
            None => 0,
        };

        self.play(tracks[target].clone())
    }

    fn next_in_queue(&mut self) -> bool {
        let mut next = self.state.get_next_track();

        if next.is_none() && self.global_repeat == RepeatMode::All && self.state.queue_len() > 0 {
            debug!("Next: wrapping queue");
            self.state.set_queue_index(0);
            next = self.state.get_next_track();
        }

        match next {
            Some(track) => self.play(track),
            None => {
                debug!("Next: queue exhausted");
                false
            }
        }
    }

    /// Go back
    ///
    /// Playlist mode restarts the current track once past the restart
    /// threshold, otherwise steps back one entry (wrapping to the end when
    /// the playlist loops, replaying the first entry when it does not).
    /// Queue mode pops the back-stack without pushing the current track.
    pub fn previous(&mut self) -> bool {
        match self.current_playlist.clone() {
            Some(playlist) => self.previous_in_playlist(playlist.as_ref()),
            None => match self.state.pop_from_back_stack() {
                Some(track) => self.play_with(track, false),
                None => {
                    debug!("Previous: back-stack is empty");
                    false
                }
            },
        }
    }

    fn previous_in_playlist(&mut self, playlist: &dyn TrackList) -> bool {
        if self.state.current_track().is_some()
            && self.state.position() > self.settings.restart_threshold_secs
        {
            debug!("Previous: restarting current track");
            self.seek(0.0);
            return true;
        }

        let tracks = playlist.tracks();
        if tracks.is_empty() {
            debug!("Previous: playlist is empty");
            return false;
        }

        let current = self
            .state
            .current_track()
            .and_then(|current| tracks.iter().position(|t| t.same_path(&current)));

        let target = match current {
            Some(0) if playlist.is_loop_enabled() => tracks.len() - 1,
            Some(0) | None => 0,
            Some(index) => index - 1,
        };

        self.play(tracks[target].clone())
    }

    /// Replace the queue with `context` and play `context[start_index]`
    ///
    /// The cursor is left just after the started track so `next` continues
    /// naturally. Empty contexts and out-of-range indices are ignored.
    pub fn play_context(&mut self, context: Vec<SharedTrack>, start_index: usize) -> bool {
        let Some(track) = context.get(start_index).cloned() else {
            debug!(start_index, len = context.len(), "Play context ignored");
            return false;
        };

        self.state.set_play_queue(context);
        self.state.set_queue_index(start_index + 1);
        self.play(track)
    }

    // ===== Playlist & repeat =====

    /// Switch between playlist mode (`Some`) and queue mode (`None`)
    ///
    /// Entering playlist mode loads the playlist into the play queue.
    pub fn set_current_playlist(&mut self, playlist: Option<Arc<dyn TrackList>>) {
        if let Some(playlist) = &playlist {
            self.state.set_play_queue(playlist.tracks());
        }
        self.current_playlist = playlist;
    }

    /// Effective repeat mode: the playlist's when one is active
    pub fn repeat_mode(&self) -> RepeatMode {
        self.current_playlist
            .as_ref()
            .map_or(self.global_repeat, |playlist| playlist.repeat_mode())
    }

    /// Set the repeat mode on whichever scope is active
    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        match &self.current_playlist {
            Some(playlist) => playlist.set_repeat_mode(mode),
            None => self.global_repeat = mode,
        }
        debug!(?mode, "Repeat mode set");
    }

    /// Cycle the effective repeat mode `None -> One -> All -> None`
    pub fn toggle_repeat_mode(&mut self) -> RepeatMode {
        let mode = self.repeat_mode().cycle();
        self.set_repeat_mode(mode);
        mode
    }

    // ===== Completion =====

    /// React to the current track ending
    ///
    /// `RepeatMode::One` replays the current track (subject to throttling);
    /// anything else advances. When nothing follows, playback has ended and
    /// the state settles on `Stopped`.
    pub fn handle_playback_finished(&mut self) {
        self.completion_armed = false;
        self.overrun = 0.0;

        if self.repeat_mode() == RepeatMode::One {
            if let Some(track) = self.state.current_track() {
                debug!(path = %track.path.display(), "Repeat one: replaying");
                self.play_with(track, false);
                return;
            }
        }

        if !self.next() {
            info!("Playback finished");
            self.state.set_status(PlaybackStatus::Stopped);
        }
    }

    /// Per-frame tick from the UI loop
    ///
    /// Advances the position while playing and detects completion either
    /// from the engine or from the position running past the duration by
    /// more than the grace period.
    pub fn update_time(&mut self, delta_secs: f64) {
        if self.state.status() != PlaybackStatus::Playing || delta_secs.is_nan() || delta_secs < 0.0
        {
            return;
        }

        let duration = self.state.duration();
        let advanced = self.state.position() + delta_secs;
        self.state.set_position(advanced);

        // The stored position never exceeds the duration, so each tick
        // past the end contributes exactly its excess
        if duration > 0.0 && advanced > duration {
            self.overrun += advanced - duration;
        } else {
            self.overrun = 0.0;
        }

        if !self.completion_armed {
            return;
        }

        let engine_finished = self.engine.is_finished();
        let ran_past_end = duration > 0.0 && self.overrun > self.settings.finish_grace_secs;

        if engine_finished || ran_past_end {
            debug!(engine_finished, ran_past_end, "Track completed");
            self.handle_playback_finished();
        }
    }

    // ===== Event entry points =====

    /// Dispatch a hardware control event
    pub fn handle_hardware_event(&mut self, event: HardwareEvent) {
        debug!(command = ?event.command, value = event.value, "Hardware event");

        match event.command {
            HardwareCommand::Next | HardwareCommand::Button(1) => {
                self.next();
            }
            HardwareCommand::Previous | HardwareCommand::Button(2) => {
                self.previous();
            }
            HardwareCommand::Play => self.resume(),
            HardwareCommand::Pause => self.pause(),
            HardwareCommand::Button(3) => {
                if self.state.status() == PlaybackStatus::Playing {
                    self.pause();
                } else {
                    self.resume();
                }
            }
            HardwareCommand::VolumeChange => self.set_volume(event.value),
            HardwareCommand::Button(_) | HardwareCommand::Unknown => {
                warn!(command = ?event.command, "Ignoring hardware command");
            }
        }
    }

    /// Dispatch an engine notification
    ///
    /// An error stops playback and reports the last attempted path through
    /// the failure callback, once per play attempt. A finished notification
    /// runs completion handling unless the tick already did or another track
    /// has started.
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        if event.is_error() || self.engine.state() == PlaybackStatus::Error {
            if self.load_failure_reported {
                debug!(event = ?event, "Failure already reported for this attempt");
                return;
            }
            self.load_failure_reported = true;

            let failed = self.last_attempted_path.clone().or(match &event {
                EngineEvent::Error { path, .. } => path.clone(),
                _ => None,
            });
            warn!(path = ?failed, event = ?event, "Playback engine reported an error");

            self.stop();
            self.completion_armed = false;

            if let (Some(callback), Some(path)) = (self.on_track_load_failed.as_mut(), &failed) {
                callback(path);
            }
            return;
        }

        match event {
            EngineEvent::Finished => {
                // Stale once the next track has started
                if self.completion_armed
                    && self.state.status() == PlaybackStatus::Playing
                    && self.engine.is_finished()
                {
                    self.handle_playback_finished();
                } else {
                    debug!("Ignoring stale finished notification");
                }
            }
            EngineEvent::StatusChanged(status) => {
                debug!(?status, "Engine status changed");
            }
            EngineEvent::Error { .. } => {}
        }
    }
}
