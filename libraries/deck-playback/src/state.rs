//! Playback state holder
//!
//! Single source of truth for what is currently happening. Every read and
//! write goes through one internal lock; change notifications are published
//! on the holder's own `EventBus` right after the lock is released, so
//! subscribers are free to read the state back from `update`.

use crate::bus::EventBus;
use deck_core::{PlaybackStatus, SharedTrack, Track};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Volume used when no configuration overrides it
pub const DEFAULT_VOLUME: f32 = 0.7;

/// Change notifications published by `PlaybackState`
///
/// Position updates are never published; they happen every frame.
#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    /// Current track and status replaced together
    PlaybackChanged {
        track: Option<SharedTrack>,
        status: PlaybackStatus,
    },

    /// Status changed
    StatusChanged(PlaybackStatus),

    /// Volume changed (already clamped)
    VolumeChanged(f32),

    /// Duration changed, in seconds
    DurationChanged(f64),

    /// Play queue replaced or cleared
    QueueChanged { len: usize },
}

/// Point-in-time copy of the holder, taken under one lock
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub track: Option<SharedTrack>,
    pub status: PlaybackStatus,
    pub volume: f32,
    pub position: f64,
    pub duration: f64,
    pub queue_len: usize,
    pub queue_index: usize,
    pub back_stack_len: usize,
}

#[derive(Debug)]
struct StateInner {
    current_track: Option<SharedTrack>,
    status: PlaybackStatus,
    volume: f32,
    position: f64,
    duration: f64,
    back_stack: Vec<SharedTrack>,
    play_queue: Vec<SharedTrack>,
    queue_index: usize,
}

/// Locked playback state
///
/// Invariants:
/// - `0 <= position <= duration`, `duration >= 0`
/// - `0.0 <= volume <= 1.0`
/// - `queue_index <= play_queue.len()`
#[derive(Debug)]
pub struct PlaybackState {
    inner: Mutex<StateInner>,
    bus: EventBus<StateEvent>,
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

fn sanitize_secs(secs: f64) -> f64 {
    if secs.is_nan() {
        0.0
    } else {
        secs.max(0.0)
    }
}

impl PlaybackState {
    /// Create an empty, stopped state with the given volume
    pub fn new(volume: f32) -> Self {
        Self {
            inner: Mutex::new(StateInner {
                current_track: None,
                status: PlaybackStatus::Stopped,
                volume: clamp_volume(volume),
                position: 0.0,
                duration: 0.0,
                back_stack: Vec::new(),
                play_queue: Vec::new(),
                queue_index: 0,
            }),
            bus: EventBus::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StateInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bus carrying this holder's change notifications
    pub fn bus(&self) -> &EventBus<StateEvent> {
        &self.bus
    }

    // ===== Playback =====

    /// Replace the current track and status
    ///
    /// Resets the position to 0 and takes the duration from the track's
    /// metadata (0 without a track). Always notifies.
    pub fn set_playback(&self, track: Option<SharedTrack>, status: PlaybackStatus) {
        {
            let mut inner = self.lock();
            inner.duration = track.as_ref().map_or(0.0, |t| t.duration_secs());
            inner.position = 0.0;
            inner.current_track.clone_from(&track);
            inner.status = status;
        }

        if let Some(track) = &track {
            tracing::info!(path = %track.path.display(), ?status, "Playback set");
        }
        self.bus.notify(&StateEvent::PlaybackChanged { track, status });
    }

    /// Set the status. Always notifies.
    pub fn set_status(&self, status: PlaybackStatus) {
        self.lock().status = status;
        self.bus.notify(&StateEvent::StatusChanged(status));
    }

    /// Set the volume, clamped to `[0, 1]`. Always notifies.
    pub fn set_volume(&self, volume: f32) {
        let volume = clamp_volume(volume);
        self.lock().volume = volume;
        self.bus.notify(&StateEvent::VolumeChanged(volume));
    }

    /// Set the duration in seconds (negative becomes 0). Always notifies.
    ///
    /// The position is pulled back inside the new duration.
    pub fn set_duration(&self, duration: f64) {
        let duration = sanitize_secs(duration);
        {
            let mut inner = self.lock();
            inner.duration = duration;
            inner.position = inner.position.min(duration);
        }
        self.bus.notify(&StateEvent::DurationChanged(duration));
    }

    /// Set the position, clamped to `[0, duration]`
    ///
    /// Called every frame, so it never notifies.
    pub fn set_position(&self, position: f64) {
        let mut inner = self.lock();
        inner.position = sanitize_secs(position).min(inner.duration);
    }

    /// Back to the initial empty, stopped state (volume and queue are kept)
    pub fn reset(&self) {
        {
            let mut inner = self.lock();
            inner.current_track = None;
            inner.status = PlaybackStatus::Stopped;
            inner.position = 0.0;
            inner.duration = 0.0;
        }
        self.bus.notify(&StateEvent::PlaybackChanged {
            track: None,
            status: PlaybackStatus::Stopped,
        });
    }

    pub fn current_track(&self) -> Option<SharedTrack> {
        self.lock().current_track.clone()
    }

    pub fn status(&self) -> PlaybackStatus {
        self.lock().status
    }

    pub fn volume(&self) -> f32 {
        self.lock().volume
    }

    pub fn position(&self) -> f64 {
        self.lock().position
    }

    pub fn duration(&self) -> f64 {
        self.lock().duration
    }

    /// Consistent copy of every field
    pub fn snapshot(&self) -> PlaybackSnapshot {
        let inner = self.lock();
        PlaybackSnapshot {
            track: inner.current_track.clone(),
            status: inner.status,
            volume: inner.volume,
            position: inner.position,
            duration: inner.duration,
            queue_len: inner.play_queue.len(),
            queue_index: inner.queue_index,
            back_stack_len: inner.back_stack.len(),
        }
    }

    // ===== Back-stack =====

    /// Push the current track, if there is one
    pub fn push_to_back_stack(&self) {
        let mut inner = self.lock();
        if let Some(track) = inner.current_track.clone() {
            inner.back_stack.push(track);
        }
    }

    /// Pop the most recently pushed track
    pub fn pop_from_back_stack(&self) -> Option<SharedTrack> {
        self.lock().back_stack.pop()
    }

    /// Drop every back-stack entry for `path`
    ///
    /// Used when a track is deleted from the library while still stacked.
    pub fn remove_track_from_back_stack(&self, path: &Path) {
        self.lock().back_stack.retain(|t| !t.is_at(path));
    }

    pub fn clear_back_stack(&self) {
        self.lock().back_stack.clear();
    }

    pub fn back_stack_len(&self) -> usize {
        self.lock().back_stack.len()
    }

    // ===== Play queue =====

    /// Replace the queue and rewind the cursor. Always notifies.
    pub fn set_play_queue(&self, queue: Vec<SharedTrack>) {
        let len = queue.len();
        {
            let mut inner = self.lock();
            inner.play_queue = queue;
            inner.queue_index = 0;
        }
        self.bus.notify(&StateEvent::QueueChanged { len });
    }

    /// Empty the queue. Always notifies.
    pub fn clear_play_queue(&self) {
        self.set_play_queue(Vec::new());
    }

    /// Move the cursor; requests past the end of the queue are ignored
    pub fn set_queue_index(&self, index: usize) {
        let mut inner = self.lock();
        if index <= inner.play_queue.len() {
            inner.queue_index = index;
        }
    }

    /// Position the cursor just after `track`
    ///
    /// Keeps `get_next_track` consistent when a track was started out of
    /// band (e.g. picked from a list). If the entry right before the cursor
    /// is already `track` the cursor stays put; otherwise the first entry
    /// with the same path wins. Unknown tracks leave the cursor unchanged.
    pub fn sync_queue_index(&self, track: &Track) {
        let mut inner = self.lock();

        let cursor = inner.queue_index;
        if cursor > 0
            && inner
                .play_queue
                .get(cursor - 1)
                .is_some_and(|t| t.same_path(track))
        {
            return;
        }

        if let Some(index) = inner.play_queue.iter().position(|t| t.same_path(track)) {
            inner.queue_index = index + 1;
        }
    }

    /// Track under the cursor, advancing it; `None` once exhausted
    pub fn get_next_track(&self) -> Option<SharedTrack> {
        let mut inner = self.lock();
        let track = inner.play_queue.get(inner.queue_index).cloned()?;
        inner.queue_index += 1;
        Some(track)
    }

    pub fn has_next_track(&self) -> bool {
        let inner = self.lock();
        inner.queue_index < inner.play_queue.len()
    }

    pub fn queue(&self) -> Vec<SharedTrack> {
        self.lock().play_queue.clone()
    }

    pub fn queue_len(&self) -> usize {
        self.lock().play_queue.len()
    }

    pub fn queue_index(&self) -> usize {
        self.lock().queue_index
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}
