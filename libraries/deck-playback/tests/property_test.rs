//! Property-based tests for the state holder and controller
//!
//! Uses proptest to verify invariants across many random inputs.

use deck_core::{PlaybackEngine, PlaybackStatus, SharedTrack, Track, TrackMetadata};
use deck_playback::{PlaybackController, PlaybackState};
use proptest::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// ===== Helpers =====

struct NullEngine;

impl PlaybackEngine for NullEngine {
    fn play(&self, _path: &Path) -> bool {
        true
    }
    fn pause(&self) {}
    fn resume(&self) {}
    fn stop(&self) {}
    fn seek(&self, _position_secs: f64) {}
    fn set_volume(&self, _volume: f32) {}
    fn state(&self) -> PlaybackStatus {
        PlaybackStatus::Playing
    }
    fn current_position(&self) -> f64 {
        0.0
    }
    fn duration(&self) -> f64 {
        0.0
    }
    fn is_finished(&self) -> bool {
        false
    }
}

fn arbitrary_queue() -> impl Strategy<Value = Vec<SharedTrack>> {
    prop::collection::vec(("[a-z]{1,8}", 1u64..600), 0..40).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (name, secs))| {
                Arc::new(Track::with_metadata(
                    format!("/music/{i}-{name}.mp3"),
                    TrackMetadata {
                        title: name,
                        duration: Duration::from_secs(secs),
                        ..TrackMetadata::default()
                    },
                ))
            })
            .collect()
    })
}

#[derive(Debug, Clone)]
enum Op {
    Next,
    Previous,
    Tick(f64),
    Seek(f64),
    Volume(f32),
    Pause,
    Resume,
    Stop,
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Next),
        Just(Op::Previous),
        (0.0f64..30.0).prop_map(Op::Tick),
        (-10.0f64..700.0).prop_map(Op::Seek),
        (-1.0f32..2.0).prop_map(Op::Volume),
        Just(Op::Pause),
        Just(Op::Resume),
        Just(Op::Stop),
    ]
}

// ===== Property Tests =====

proptest! {
    /// Property: draining the queue yields it in order, then nothing
    #[test]
    fn queue_round_trip(queue in arbitrary_queue()) {
        let state = PlaybackState::default();
        state.set_play_queue(queue.clone());

        let drained: Vec<_> = (0..queue.len()).filter_map(|_| state.get_next_track()).collect();

        prop_assert_eq!(drained, queue);
        prop_assert!(state.get_next_track().is_none());
    }

    /// Property: position always stays inside [0, duration]
    #[test]
    fn position_is_clamped(secs in 0u64..600, writes in prop::collection::vec(-1000.0f64..1000.0, 1..20)) {
        let state = PlaybackState::default();
        let track = Arc::new(Track::with_metadata(
            "/music/clamp.mp3",
            TrackMetadata { duration: Duration::from_secs(secs), ..TrackMetadata::default() },
        ));
        state.set_playback(Some(track), PlaybackStatus::Playing);

        for position in writes {
            state.set_position(position);
            let current = state.position();
            prop_assert!(current >= 0.0);
            prop_assert!(current <= state.duration());
        }
    }

    /// Property: volume always stays inside [0, 1]
    #[test]
    fn volume_is_clamped(volume in prop::num::f32::ANY) {
        let state = PlaybackState::default();
        state.set_volume(volume);

        let stored = state.volume();
        prop_assert!((0.0..=1.0).contains(&stored));
    }

    /// Property: random command sequences keep every invariant
    #[test]
    fn controller_preserves_state_invariants(
        queue in arbitrary_queue(),
        ops in prop::collection::vec(arbitrary_op(), 0..60),
    ) {
        let state = Arc::new(PlaybackState::default());
        let mut controller = PlaybackController::new(state.clone(), Arc::new(NullEngine));
        let len = queue.len();
        controller.play_context(queue, 0);

        for op in ops {
            match op {
                Op::Next => { controller.next(); }
                Op::Previous => { controller.previous(); }
                Op::Tick(delta) => controller.update_time(delta),
                Op::Seek(position) => controller.seek(position),
                Op::Volume(volume) => controller.set_volume(volume),
                Op::Pause => controller.pause(),
                Op::Resume => controller.resume(),
                Op::Stop => controller.stop(),
            }

            let snapshot = state.snapshot();
            prop_assert!(snapshot.position >= 0.0);
            prop_assert!(snapshot.position <= snapshot.duration);
            prop_assert!((0.0..=1.0).contains(&snapshot.volume));
            prop_assert!(snapshot.queue_index <= len);
            prop_assert_eq!(snapshot.queue_len, len);
        }
    }
}
