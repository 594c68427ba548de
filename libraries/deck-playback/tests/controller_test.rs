//! Integration tests for the playback controller
//!
//! Drives the controller against a recording mock engine, the real history
//! and playlist models and a manual clock.

use deck_core::{
    EngineEvent, HardwareCommand, HardwareEvent, History, PlaybackEngine, PlaybackStatus,
    Playlist, RepeatMode, SharedTrack, Track, TrackList, TrackMetadata,
};
use deck_playback::{ManualClock, PlaybackController, PlaybackState};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ===== Test Helpers =====

#[derive(Debug, Clone, PartialEq)]
enum EngineCall {
    Play(PathBuf),
    Pause,
    Resume,
    Stop,
    Seek(f64),
    SetVolume(f32),
}

/// Engine that records every call
struct MockEngine {
    calls: Mutex<Vec<EngineCall>>,
    play_result: AtomicBool,
    finished: AtomicBool,
    status: Mutex<PlaybackStatus>,
}

impl MockEngine {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            play_result: AtomicBool::new(true),
            finished: AtomicBool::new(false),
            status: Mutex::new(PlaybackStatus::Stopped),
        }
    }

    fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    fn plays(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::Play(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    fn set_finished(&self, finished: bool) {
        self.finished.store(finished, Ordering::SeqCst);
    }

    fn set_status(&self, status: PlaybackStatus) {
        *self.status.lock().unwrap() = status;
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl PlaybackEngine for MockEngine {
    fn play(&self, path: &Path) -> bool {
        self.record(EngineCall::Play(path.to_path_buf()));
        self.set_finished(false);
        let started = self.play_result.load(Ordering::SeqCst);
        self.set_status(if started {
            PlaybackStatus::Playing
        } else {
            PlaybackStatus::Error
        });
        started
    }

    fn pause(&self) {
        self.record(EngineCall::Pause);
    }

    fn resume(&self) {
        self.record(EngineCall::Resume);
    }

    fn stop(&self) {
        self.record(EngineCall::Stop);
        self.set_status(PlaybackStatus::Stopped);
    }

    fn seek(&self, position_secs: f64) {
        self.record(EngineCall::Seek(position_secs));
    }

    fn set_volume(&self, volume: f32) {
        self.record(EngineCall::SetVolume(volume));
    }

    fn state(&self) -> PlaybackStatus {
        *self.status.lock().unwrap()
    }

    fn current_position(&self) -> f64 {
        0.0
    }

    fn duration(&self) -> f64 {
        0.0
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

struct Harness {
    controller: PlaybackController,
    state: Arc<PlaybackState>,
    engine: Arc<MockEngine>,
    history: Arc<History>,
    clock: Arc<ManualClock>,
}

impl Harness {
    fn new() -> Self {
        let state = Arc::new(PlaybackState::default());
        let engine = Arc::new(MockEngine::new());
        let history = Arc::new(History::new(50));
        let clock = Arc::new(ManualClock::new());

        let controller = PlaybackController::new(state.clone(), engine.clone())
            .with_history(history.clone())
            .with_clock(clock.clone());

        Self {
            controller,
            state,
            engine,
            history,
            clock,
        }
    }

    fn with_playlist(mut self, playlist: Arc<Playlist>) -> Self {
        self.controller = self.controller.with_playlist(playlist);
        self
    }

    /// Step past the duplicate-play window
    fn wait(&self) {
        self.clock.advance(Duration::from_secs(1));
    }

    fn current(&self) -> Option<PathBuf> {
        self.state.current_track().map(|t| t.path.clone())
    }
}

fn track(name: &str) -> SharedTrack {
    Arc::new(Track::new(format!("/music/{name}.mp3")))
}

fn timed_track(name: &str, secs: u64) -> SharedTrack {
    Arc::new(Track::with_metadata(
        format!("/music/{name}.mp3"),
        TrackMetadata {
            title: name.to_string(),
            duration: Duration::from_secs(secs),
            ..TrackMetadata::default()
        },
    ))
}

fn path(name: &str) -> PathBuf {
    PathBuf::from(format!("/music/{name}.mp3"))
}

// ===== play =====

#[test]
fn play_sets_current_track_and_status() {
    let mut h = Harness::new();
    let t = timed_track("t", 180);

    assert!(h.controller.play(t.clone()));

    assert_eq!(h.state.current_track(), Some(t));
    assert_eq!(h.state.status(), PlaybackStatus::Playing);
    assert_eq!(h.state.duration(), 180.0);
    assert_eq!(h.engine.plays(), vec![path("t")]);
    assert_eq!(h.history.len(), 1);
    assert_eq!(h.controller.last_attempted_path(), Some(path("t").as_path()));
}

#[test]
fn play_returns_engine_result_verbatim() {
    let mut h = Harness::new();
    h.engine.play_result.store(false, Ordering::SeqCst);

    assert!(!h.controller.play(track("broken")));

    // Status is set before the engine answers
    assert_eq!(h.state.status(), PlaybackStatus::Playing);
    assert_eq!(h.current(), Some(path("broken")));
}

#[test]
fn duplicate_play_within_window_is_collapsed() {
    let mut h = Harness::new();
    let x = track("x");

    let first = h.controller.play(x.clone());
    h.clock.advance(Duration::from_millis(200));
    let second = h.controller.play(x);

    assert_eq!(first, second);
    assert_eq!(h.engine.plays().len(), 1);
    assert_eq!(h.history.len(), 1);
}

#[test]
fn duplicate_play_returns_the_first_result() {
    let mut h = Harness::new();
    h.engine.play_result.store(false, Ordering::SeqCst);
    let x = track("x");

    assert!(!h.controller.play(x.clone()));

    h.engine.play_result.store(true, Ordering::SeqCst);
    assert!(!h.controller.play(x));
    assert_eq!(h.engine.plays().len(), 1);
}

#[test]
fn same_track_after_window_reaches_engine_again() {
    let mut h = Harness::new();
    let x = track("x");

    h.controller.play(x.clone());
    h.wait();
    h.controller.play(x);

    assert_eq!(h.engine.plays().len(), 2);
    // History keeps one entry per path
    assert_eq!(h.history.len(), 1);
}

#[test]
fn different_track_is_never_throttled() {
    let mut h = Harness::new();

    h.controller.play(track("a"));
    h.controller.play(track("b"));

    assert_eq!(h.engine.plays(), vec![path("a"), path("b")]);
    assert_eq!(h.current(), Some(path("b")));
}

#[test]
fn play_pushes_current_track_onto_back_stack() {
    let mut h = Harness::new();

    h.controller.play(track("a"));
    assert_eq!(h.state.back_stack_len(), 0);

    h.controller.play(track("b"));
    assert_eq!(h.state.back_stack_len(), 1);

    h.controller.play_with(track("c"), false);
    assert_eq!(h.state.back_stack_len(), 1);
}

#[test]
fn history_lists_most_recent_first() {
    let mut h = Harness::new();

    h.controller.play(track("a"));
    h.controller.play(track("b"));
    h.controller.play(track("c"));

    let recent: Vec<_> = h.history.recent(2).iter().map(|t| t.path.clone()).collect();
    assert_eq!(recent, vec![path("c"), path("b")]);
}

// ===== Queue mode navigation =====

#[test]
fn queue_navigation_without_repeat_ends_at_last_track() {
    let mut h = Harness::new();
    let queue = vec![track("t1"), track("t2"), track("t3")];
    h.state.set_play_queue(queue.clone());

    assert!(h.controller.play(queue[0].clone()));
    assert!(h.controller.next());
    assert_eq!(h.current(), Some(path("t2")));
    assert!(h.controller.next());
    assert_eq!(h.current(), Some(path("t3")));

    assert!(!h.controller.next());
    assert_eq!(h.current(), Some(path("t3")));
}

#[test]
fn queue_wraps_once_with_repeat_all() {
    let mut h = Harness::new();
    h.controller.set_repeat_mode(RepeatMode::All);
    let queue = vec![track("t1"), track("t2")];
    h.state.set_play_queue(queue.clone());

    h.controller.play(queue[0].clone());
    h.wait();
    assert!(h.controller.next());
    assert!(!h.state.has_next_track());

    h.wait();
    assert!(h.controller.next());
    assert_eq!(h.current(), Some(path("t1")));
    assert_eq!(h.state.queue_index(), 1);
}

#[test]
fn out_of_band_play_keeps_queue_cursor_consistent() {
    let mut h = Harness::new();
    let queue = vec![track("a"), track("b"), track("c"), track("d")];
    h.state.set_play_queue(queue.clone());

    // Picked from a list, not through next()
    h.controller.play(queue[2].clone());
    assert!(h.controller.next());
    assert_eq!(h.current(), Some(path("d")));
}

#[test]
fn back_stack_is_lifo() {
    let mut h = Harness::new();

    h.controller.play(track("t1"));
    h.controller.play(track("t2"));
    h.controller.play(track("t3"));

    assert!(h.controller.previous());
    assert_eq!(h.current(), Some(path("t2")));
    assert!(h.controller.previous());
    assert_eq!(h.current(), Some(path("t1")));

    assert!(!h.controller.previous());
    assert_eq!(h.current(), Some(path("t1")));
    assert_eq!(h.state.back_stack_len(), 0);
}

#[test]
fn navigation_on_empty_model_changes_nothing() {
    let mut h = Harness::new();
    let before = h.state.snapshot();

    assert!(!h.controller.next());
    assert!(!h.controller.previous());

    assert_eq!(h.state.snapshot(), before);
    assert!(h.engine.calls().is_empty());
}

#[test]
fn play_context_starts_track_and_positions_cursor() {
    let mut h = Harness::new();
    let context = vec![track("a"), track("b"), track("c")];

    assert!(h.controller.play_context(context, 1));

    assert_eq!(h.current(), Some(path("b")));
    assert_eq!(h.state.queue_len(), 3);
    assert_eq!(h.state.queue_index(), 2);

    assert!(h.controller.next());
    assert_eq!(h.current(), Some(path("c")));
}

#[test]
fn play_context_ignores_invalid_requests() {
    let mut h = Harness::new();
    h.state.set_play_queue(vec![track("keep")]);

    assert!(!h.controller.play_context(Vec::new(), 0));
    assert!(!h.controller.play_context(vec![track("a")], 1));

    assert_eq!(h.state.queue_len(), 1);
    assert!(h.state.current_track().is_none());
    assert!(h.engine.plays().is_empty());
}

// ===== Playlist mode navigation =====

fn playlist(names: &[&str], mode: RepeatMode) -> Arc<Playlist> {
    let playlist = Arc::new(Playlist::with_tracks(
        "Test",
        names.iter().map(|name| track(name)).collect(),
    ));
    playlist.set_repeat_mode(mode);
    playlist
}

#[test]
fn playlist_next_stops_at_end_without_repeat() {
    let mut h = Harness::new().with_playlist(playlist(&["a", "b"], RepeatMode::None));

    h.controller.play(track("a"));
    assert!(h.controller.next());
    assert_eq!(h.current(), Some(path("b")));

    assert!(!h.controller.next());
    assert_eq!(h.current(), Some(path("b")));
}

#[test]
fn playlist_next_wraps_with_repeat_all() {
    let mut h = Harness::new().with_playlist(playlist(&["a", "b"], RepeatMode::All));

    h.controller.play(track("b"));
    assert!(h.controller.next());
    assert_eq!(h.current(), Some(path("a")));
}

#[test]
fn playlist_next_restarts_when_current_track_is_missing() {
    let mut h = Harness::new().with_playlist(playlist(&["a", "b"], RepeatMode::None));

    h.controller.play(track("elsewhere"));
    assert!(h.controller.next());
    assert_eq!(h.current(), Some(path("a")));
}

#[test]
fn playlist_next_on_empty_playlist_fails() {
    let mut h = Harness::new().with_playlist(playlist(&[], RepeatMode::All));

    h.controller.play(track("x"));
    assert!(!h.controller.next());
    assert_eq!(h.current(), Some(path("x")));
}

#[test]
fn playlist_previous_steps_back() {
    let mut h = Harness::new().with_playlist(playlist(&["a", "b", "c"], RepeatMode::None));

    h.controller.play(track("c"));
    assert!(h.controller.previous());
    assert_eq!(h.current(), Some(path("b")));
}

#[test]
fn playlist_previous_at_start_replays_first_track_without_loop() {
    let mut h = Harness::new().with_playlist(playlist(&["a", "b"], RepeatMode::None));

    h.controller.play(track("a"));
    h.wait();
    assert!(h.controller.previous());
    assert_eq!(h.current(), Some(path("a")));
    assert_eq!(h.engine.plays(), vec![path("a"), path("a")]);
}

#[test]
fn playlist_previous_at_start_wraps_with_loop() {
    let mut h = Harness::new().with_playlist(playlist(&["a", "b", "c"], RepeatMode::All));

    h.controller.play(track("a"));
    assert!(h.controller.previous());
    assert_eq!(h.current(), Some(path("c")));
}

#[test]
fn playlist_previous_restarts_track_past_threshold() {
    let list = Arc::new(Playlist::with_tracks(
        "Long",
        vec![timed_track("a", 200), timed_track("b", 200)],
    ));
    let mut h = Harness::new().with_playlist(list);

    h.controller.play(timed_track("b", 200));
    h.controller.update_time(5.0);
    assert_eq!(h.state.position(), 5.0);

    assert!(h.controller.previous());

    assert_eq!(h.current(), Some(path("b")));
    assert_eq!(h.state.position(), 0.0);
    assert!(h.engine.calls().contains(&EngineCall::Seek(0.0)));
    assert_eq!(h.engine.plays().len(), 1);
}

#[test]
fn playlist_previous_below_threshold_changes_track() {
    let list = Arc::new(Playlist::with_tracks(
        "Long",
        vec![timed_track("a", 200), timed_track("b", 200)],
    ));
    let mut h = Harness::new().with_playlist(list);

    h.controller.play(timed_track("b", 200));
    h.controller.update_time(2.0);

    assert!(h.controller.previous());
    assert_eq!(h.current(), Some(path("a")));
}

#[test]
fn set_current_playlist_loads_queue() {
    let mut h = Harness::new();
    let list = playlist(&["a", "b", "c"], RepeatMode::None);

    h.controller.set_current_playlist(Some(list));
    assert_eq!(h.state.queue_len(), 3);
    assert!(h.controller.current_playlist().is_some());

    h.controller.set_current_playlist(None);
    assert!(h.controller.current_playlist().is_none());
}

// ===== Repeat modes =====

#[test]
fn toggle_repeat_mode_cycles_global_mode() {
    let mut h = Harness::new();

    assert_eq!(h.controller.repeat_mode(), RepeatMode::None);
    assert_eq!(h.controller.toggle_repeat_mode(), RepeatMode::One);
    assert_eq!(h.controller.toggle_repeat_mode(), RepeatMode::All);
    assert_eq!(h.controller.toggle_repeat_mode(), RepeatMode::None);
}

#[test]
fn repeat_mode_is_playlist_scoped_when_playlist_active() {
    let list = playlist(&["a"], RepeatMode::None);
    let mut h = Harness::new().with_playlist(list.clone());

    h.controller.set_repeat_mode(RepeatMode::All);
    assert_eq!(list.repeat_mode(), RepeatMode::All);

    h.controller.set_current_playlist(None);
    assert_eq!(h.controller.repeat_mode(), RepeatMode::None);
}

#[test]
fn repeat_one_replays_current_track_on_finish() {
    let mut h = Harness::new().with_playlist(playlist(&["a", "b"], RepeatMode::One));

    h.controller.play(track("b"));
    h.controller.handle_playback_finished();

    assert_eq!(h.current(), Some(path("b")));
    assert_eq!(h.state.position(), 0.0);
}

#[test]
fn repeat_one_replay_reaches_engine_after_window() {
    let mut h = Harness::new().with_playlist(playlist(&["a", "b"], RepeatMode::One));

    h.controller.play(track("b"));
    h.wait();
    h.controller.handle_playback_finished();

    assert_eq!(h.engine.plays(), vec![path("b"), path("b")]);
    // Replays never grow the back-stack
    assert_eq!(h.state.back_stack_len(), 0);
}

#[test]
fn finish_advances_to_next_track() {
    let mut h = Harness::new();
    h.controller.play_context(vec![track("a"), track("b")], 0);

    h.controller.handle_playback_finished();
    assert_eq!(h.current(), Some(path("b")));
    assert_eq!(h.state.status(), PlaybackStatus::Playing);
}

#[test]
fn finish_at_end_of_queue_stops() {
    let mut h = Harness::new();
    h.controller.play_context(vec![track("a")], 0);

    h.controller.handle_playback_finished();

    assert_eq!(h.current(), Some(path("a")));
    assert_eq!(h.state.status(), PlaybackStatus::Stopped);
}

// ===== update_time =====

#[test]
fn update_time_only_advances_while_playing() {
    let mut h = Harness::new();
    h.controller.play(timed_track("a", 100));

    h.controller.update_time(1.5);
    assert_eq!(h.state.position(), 1.5);

    h.controller.pause();
    h.controller.update_time(10.0);
    assert_eq!(h.state.position(), 1.5);

    h.controller.resume();
    h.controller.update_time(0.5);
    assert_eq!(h.state.position(), 2.0);
}

#[test]
fn update_time_ignores_invalid_deltas() {
    let mut h = Harness::new();
    h.controller.play(timed_track("a", 100));
    h.controller.update_time(3.0);

    h.controller.update_time(-1.0);
    h.controller.update_time(f64::NAN);

    assert_eq!(h.state.position(), 3.0);
}

#[test]
fn update_time_follows_engine_completion() {
    let mut h = Harness::new();
    h.controller.play_context(vec![timed_track("a", 100), track("b")], 0);

    h.engine.set_finished(true);
    h.controller.update_time(0.016);

    assert_eq!(h.current(), Some(path("b")));
}

#[test]
fn update_time_falls_back_to_position_past_grace() {
    let mut h = Harness::new();
    h.controller.play_context(vec![timed_track("a", 10), track("b")], 0);

    h.controller.update_time(10.5);
    assert_eq!(h.current(), Some(path("a")));
    assert_eq!(h.state.position(), 10.0);

    h.controller.update_time(0.6);
    assert_eq!(h.current(), Some(path("b")));
}

#[test]
fn update_time_without_duration_never_uses_fallback() {
    let mut h = Harness::new();
    h.controller.play_context(vec![track("a"), track("b")], 0);

    h.controller.update_time(1000.0);

    assert_eq!(h.current(), Some(path("a")));
}

#[test]
fn engine_finished_then_tick_completes_once() {
    let mut h = Harness::new();
    h.controller
        .play_context(vec![track("a"), track("b"), track("c")], 0);

    h.engine.set_finished(true);
    h.controller.handle_engine_event(EngineEvent::Finished);
    assert_eq!(h.current(), Some(path("b")));

    h.controller.update_time(0.016);
    assert_eq!(h.current(), Some(path("b")));
}

#[test]
fn finished_notification_for_replaced_track_is_ignored() {
    let mut h = Harness::new();
    h.controller.play_context(vec![track("a"), track("b")], 0);

    // Engine already moved on
    h.engine.set_finished(false);
    h.controller.handle_engine_event(EngineEvent::Finished);

    assert_eq!(h.current(), Some(path("a")));
}

#[test]
fn engine_finished_while_paused_is_ignored() {
    let mut h = Harness::new();
    h.controller.play_context(vec![track("a"), track("b")], 0);
    h.controller.pause();

    h.controller.handle_engine_event(EngineEvent::Finished);

    assert_eq!(h.current(), Some(path("a")));
}

// ===== Transport =====

#[test]
fn pause_and_resume_need_a_current_track() {
    let mut h = Harness::new();

    h.controller.pause();
    h.controller.resume();

    assert!(h.engine.calls().is_empty());
    assert_eq!(h.state.status(), PlaybackStatus::Stopped);
}

#[test]
fn stop_keeps_track_and_rewinds() {
    let mut h = Harness::new();
    h.controller.play(timed_track("a", 100));
    h.controller.update_time(12.0);

    h.controller.stop();

    assert_eq!(h.state.status(), PlaybackStatus::Stopped);
    assert_eq!(h.state.position(), 0.0);
    assert_eq!(h.current(), Some(path("a")));
    assert_eq!(h.engine.calls().last(), Some(&EngineCall::Stop));
}

#[test]
fn seek_updates_engine_and_state() {
    let mut h = Harness::new();
    h.controller.play(timed_track("a", 100));

    h.controller.seek(42.0);

    assert_eq!(h.state.position(), 42.0);
    assert!(h.engine.calls().contains(&EngineCall::Seek(42.0)));
}

#[test]
fn set_volume_is_clamped_for_state_and_engine() {
    let mut h = Harness::new();

    h.controller.set_volume(1.7);

    assert_eq!(h.state.volume(), 1.0);
    assert_eq!(h.engine.calls(), vec![EngineCall::SetVolume(1.0)]);
}

// ===== Hardware events =====

#[test]
fn hardware_next_matches_direct_next() {
    let queue = vec![track("a"), track("b"), track("c")];

    let mut direct = Harness::new();
    direct.controller.play_context(queue.clone(), 0);
    direct.controller.next();

    let mut hardware = Harness::new();
    hardware.controller.play_context(queue, 0);
    hardware
        .controller
        .handle_hardware_event(HardwareEvent::new(HardwareCommand::Next));

    assert_eq!(hardware.state.snapshot(), direct.state.snapshot());
}

#[test]
fn hardware_legacy_buttons_navigate() {
    let mut h = Harness::new();
    h.controller
        .play_context(vec![track("a"), track("b"), track("c")], 0);

    h.controller.handle_hardware_event(HardwareEvent::button(1));
    assert_eq!(h.current(), Some(path("b")));

    h.controller.handle_hardware_event(HardwareEvent::button(2));
    assert_eq!(h.current(), Some(path("a")));
}

#[test]
fn hardware_button_three_toggles_pause() {
    let mut h = Harness::new();
    h.controller.play(track("a"));

    h.controller.handle_hardware_event(HardwareEvent::button(3));
    assert_eq!(h.state.status(), PlaybackStatus::Paused);

    h.controller.handle_hardware_event(HardwareEvent::button(3));
    assert_eq!(h.state.status(), PlaybackStatus::Playing);
}

#[test]
fn hardware_play_and_pause_map_to_resume_and_pause() {
    let mut h = Harness::new();
    h.controller.play(track("a"));

    h.controller
        .handle_hardware_event(HardwareEvent::new(HardwareCommand::Pause));
    assert_eq!(h.state.status(), PlaybackStatus::Paused);

    h.controller
        .handle_hardware_event(HardwareEvent::new(HardwareCommand::Play));
    assert_eq!(h.state.status(), PlaybackStatus::Playing);
    assert!(h.engine.calls().contains(&EngineCall::Resume));
}

#[test]
fn hardware_volume_sets_volume() {
    let mut h = Harness::new();

    h.controller.handle_hardware_event(HardwareEvent::volume(0.25));

    assert_eq!(h.state.volume(), 0.25);
}

#[test]
fn unknown_hardware_commands_are_ignored() {
    let mut h = Harness::new();
    h.controller.play(track("a"));
    let before = h.state.snapshot();
    let calls = h.engine.calls().len();

    h.controller.handle_hardware_event(HardwareEvent::default());
    h.controller.handle_hardware_event(HardwareEvent::button(9));

    assert_eq!(h.state.snapshot(), before);
    assert_eq!(h.engine.calls().len(), calls);
}

// ===== Engine errors =====

fn failure_recorder(controller: &mut PlaybackController) -> Arc<Mutex<Vec<PathBuf>>> {
    let failed = Arc::new(Mutex::new(Vec::new()));
    let sink = failed.clone();
    controller.set_on_track_load_failed(move |path: &Path| {
        sink.lock().unwrap().push(path.to_path_buf());
    });
    failed
}

#[test]
fn engine_error_stops_and_reports_last_attempted_path() {
    let mut h = Harness::new();
    let failed = failure_recorder(&mut h.controller);

    h.controller.play(track("bad"));
    h.controller
        .handle_engine_event(EngineEvent::error(None, "decoder failed"));

    assert_eq!(h.state.status(), PlaybackStatus::Stopped);
    assert_eq!(h.engine.calls().last(), Some(&EngineCall::Stop));
    assert_eq!(*failed.lock().unwrap(), vec![path("bad")]);
}

#[test]
fn engine_error_status_is_reported() {
    let mut h = Harness::new();
    let failed = failure_recorder(&mut h.controller);
    h.engine.play_result.store(false, Ordering::SeqCst);

    h.controller.play(track("bad"));
    h.controller
        .handle_engine_event(EngineEvent::StatusChanged(PlaybackStatus::Error));

    assert_eq!(*failed.lock().unwrap(), vec![path("bad")]);
    assert_eq!(h.state.status(), PlaybackStatus::Stopped);
}

#[test]
fn one_failed_load_is_reported_once() {
    let mut h = Harness::new();
    let failed = failure_recorder(&mut h.controller);
    h.engine.play_result.store(false, Ordering::SeqCst);

    h.controller.play(track("bad"));
    h.controller
        .handle_engine_event(EngineEvent::error(Some(path("bad")), "no such file"));
    h.controller
        .handle_engine_event(EngineEvent::StatusChanged(PlaybackStatus::Error));

    assert_eq!(*failed.lock().unwrap(), vec![path("bad")]);
    let stops = h
        .engine
        .calls()
        .iter()
        .filter(|call| **call == EngineCall::Stop)
        .count();
    assert_eq!(stops, 1);
}

#[test]
fn next_attempt_reports_its_own_failure() {
    let mut h = Harness::new();
    let failed = failure_recorder(&mut h.controller);
    h.engine.play_result.store(false, Ordering::SeqCst);

    h.controller.play(track("bad"));
    h.controller
        .handle_engine_event(EngineEvent::error(None, "no such file"));
    h.controller.play(track("worse"));
    h.controller
        .handle_engine_event(EngineEvent::error(None, "no such file"));

    assert_eq!(*failed.lock().unwrap(), vec![path("bad"), path("worse")]);
}

#[test]
fn engine_error_without_play_uses_event_path() {
    let mut h = Harness::new();
    let failed = failure_recorder(&mut h.controller);

    h.controller.handle_engine_event(EngineEvent::error(
        Some(path("external")),
        "device lost",
    ));

    assert_eq!(*failed.lock().unwrap(), vec![path("external")]);
}

#[test]
fn engine_status_change_is_not_an_error() {
    let mut h = Harness::new();
    let failed = failure_recorder(&mut h.controller);
    h.controller.play(track("a"));

    h.controller
        .handle_engine_event(EngineEvent::StatusChanged(PlaybackStatus::Playing));

    assert!(failed.lock().unwrap().is_empty());
    assert_eq!(h.state.status(), PlaybackStatus::Playing);
}
