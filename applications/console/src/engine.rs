//! Wall-clock playback engine
//!
//! Decodes nothing: a "playing" file simply runs for its known duration.
//! Lifecycle notifications are published on an engine `EventBus` from
//! `poll`, which the main loop calls once per frame, the way a real engine
//! publishes from its decode thread.

use deck_core::{EngineEvent, PlaybackEngine, PlaybackStatus};
use deck_playback::EventBus;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

#[derive(Debug, Default)]
struct EngineInner {
    path: Option<PathBuf>,
    status: PlaybackStatus,
    /// Set while playing
    started_at: Option<Instant>,
    /// Seconds played before the last pause or seek
    offset: f64,
    duration: f64,
    volume: f32,
    finish_reported: bool,
    pending_error: Option<EngineEvent>,
}

impl EngineInner {
    fn position(&self) -> f64 {
        let running = self
            .started_at
            .map_or(0.0, |started| started.elapsed().as_secs_f64());
        let position = self.offset + running;
        if self.duration > 0.0 {
            position.min(self.duration)
        } else {
            position
        }
    }

    fn is_finished(&self) -> bool {
        self.path.is_some() && self.duration > 0.0 && self.position() >= self.duration
    }
}

/// Engine that plays silence for each track's duration
pub struct SimulatedEngine {
    inner: Mutex<EngineInner>,
    durations: HashMap<PathBuf, f64>,
    events: Arc<EventBus<EngineEvent>>,
}

impl SimulatedEngine {
    /// `durations` maps each known file to its length in seconds
    pub fn new(durations: HashMap<PathBuf, f64>, events: Arc<EventBus<EngineEvent>>) -> Self {
        Self {
            inner: Mutex::new(EngineInner {
                volume: 1.0,
                ..EngineInner::default()
            }),
            durations,
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, EngineInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish pending notifications
    pub fn poll(&self) {
        let event = {
            let mut inner = self.lock();
            if let Some(error) = inner.pending_error.take() {
                Some(error)
            } else if inner.status == PlaybackStatus::Playing
                && !inner.finish_reported
                && inner.is_finished()
            {
                inner.finish_reported = true;
                inner.status = PlaybackStatus::Stopped;
                inner.offset = inner.duration;
                inner.started_at = None;
                Some(EngineEvent::Finished)
            } else {
                None
            }
        };

        // Never publish while holding the engine lock
        if let Some(event) = event {
            tracing::debug!(?event, "Engine event");
            self.events.notify(&event);
        }
    }
}

impl PlaybackEngine for SimulatedEngine {
    fn play(&self, path: &Path) -> bool {
        let mut inner = self.lock();
        inner.path = Some(path.to_path_buf());
        inner.offset = 0.0;
        inner.finish_reported = false;

        if !path.is_file() {
            inner.status = PlaybackStatus::Error;
            inner.started_at = None;
            inner.duration = 0.0;
            inner.pending_error = Some(EngineEvent::error(
                Some(path.to_path_buf()),
                "file not found",
            ));
            return false;
        }

        inner.duration = self.durations.get(path).copied().unwrap_or_default();
        inner.status = PlaybackStatus::Playing;
        inner.started_at = Some(Instant::now());
        true
    }

    fn pause(&self) {
        let mut inner = self.lock();
        if inner.status == PlaybackStatus::Playing {
            inner.offset = inner.position();
            inner.started_at = None;
            inner.status = PlaybackStatus::Paused;
        }
    }

    fn resume(&self) {
        let mut inner = self.lock();
        if inner.status == PlaybackStatus::Paused {
            inner.started_at = Some(Instant::now());
            inner.status = PlaybackStatus::Playing;
        }
    }

    fn stop(&self) {
        let mut inner = self.lock();
        inner.status = PlaybackStatus::Stopped;
        inner.started_at = None;
        inner.offset = 0.0;
        inner.path = None;
    }

    fn seek(&self, position_secs: f64) {
        let mut inner = self.lock();
        inner.offset = position_secs.max(0.0);
        inner.finish_reported = false;
        if inner.started_at.is_some() {
            inner.started_at = Some(Instant::now());
        }
    }

    fn set_volume(&self, volume: f32) {
        self.lock().volume = volume.clamp(0.0, 1.0);
    }

    fn state(&self) -> PlaybackStatus {
        self.lock().status
    }

    fn current_position(&self) -> f64 {
        self.lock().position()
    }

    fn duration(&self) -> f64 {
        self.lock().duration
    }

    fn is_finished(&self) -> bool {
        self.lock().is_finished()
    }
}
