/// Deck Console - terminal front-end for the playback core
mod engine;
mod input;

use anyhow::{bail, Context};
use clap::Parser;
use crossbeam_channel::{bounded, RecvTimeoutError};
use deck_core::{
    EngineEvent, HardwareEvent, History, PlaybackEngine, Playlist, SharedTrack, Track,
};
use deck_playback::{
    ControllerSettings, EventBus, PlaybackController, PlaybackService, PlaybackState,
    PlayerConfig, StateEvent, Subscriber,
};
use engine::SimulatedEngine;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "opus", "wav", "m4a", "aac"];

#[derive(Parser)]
#[command(name = "deck-console")]
#[command(
    about = "Deck Player with a simulated engine and a stdin control surface",
    long_about = None
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Audio files or directories to play
    #[arg(short, long, num_args = 1.., required = true)]
    library: Vec<PathBuf>,

    /// Navigate the library as a playlist instead of a play queue
    #[arg(long)]
    playlist: bool,

    /// Simulated length of every track in seconds
    #[arg(long, default_value_t = 30.0)]
    track_secs: f64,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deck_console=info,deck_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = PlayerConfig::load(cli.config.as_deref())?;
    let track_length = Duration::try_from_secs_f64(cli.track_secs)
        .context("--track-secs must be a non-negative number")?;

    let tracks = load_library(&cli.library, track_length)?;
    if tracks.is_empty() {
        bail!("No audio files found in the given library paths");
    }
    tracing::info!("Loaded {} tracks", tracks.len());

    run(&config, tracks, cli.playlist)
}

fn run(
    config: &PlayerConfig,
    tracks: Vec<SharedTrack>,
    playlist_mode: bool,
) -> anyhow::Result<()> {
    // Engine publishes lifecycle events on its own bus
    let engine_bus = Arc::new(EventBus::<EngineEvent>::new());
    let durations: HashMap<PathBuf, f64> = tracks
        .iter()
        .map(|track| (track.path.clone(), track.duration_secs()))
        .collect();
    let engine = Arc::new(SimulatedEngine::new(durations, engine_bus.clone()));

    let state = Arc::new(PlaybackState::new(config.playback.default_volume));
    let logger: Arc<dyn Subscriber<StateEvent>> = Arc::new(log_state_event);
    state.bus().attach(logger);
    engine.set_volume(state.volume());

    let history = Arc::new(History::new(config.history.max_size));

    let mut controller = PlaybackController::new(state.clone(), engine.clone())
        .with_history(history.clone())
        .with_settings(ControllerSettings::from(&config.playback));
    if playlist_mode {
        let playlist = Playlist::with_tracks("Library", tracks.clone());
        controller = controller.with_playlist(Arc::new(playlist));
    }
    controller.set_on_track_load_failed(|path: &Path| {
        tracing::warn!(path = %path.display(), "Track failed to load");
    });

    let service = PlaybackService::spawn(controller, &config.service)?;
    let handle = service.handle();

    let engine_sub = handle.engine_subscriber();
    engine_bus.attach(engine_sub.clone());
    let hardware = Arc::new(EventBus::<HardwareEvent>::new());
    let hardware_sub = handle.hardware_subscriber();
    hardware.attach(hardware_sub.clone());

    let started = if playlist_mode {
        handle.play(tracks[0].clone())?
    } else {
        handle.play_context(tracks, 0)?
    };
    if !started {
        tracing::warn!("First track did not start");
    }

    let (quit_tx, quit_rx) = bounded(1);
    input::spawn_listener(hardware.clone(), handle.clone(), state.clone(), quit_tx)?;
    tracing::info!("Commands: next, prev, play, pause, vol <0-1>, btn <n>, repeat, status, quit");

    // Frame loop
    let tick_interval = Duration::from_millis(config.service.tick_interval_ms);
    let mut last_tick = Instant::now();
    loop {
        match quit_rx.recv_timeout(tick_interval) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        // A tick refused by a full mailbox is carried by the handle
        let now = Instant::now();
        handle.tick(now.duration_since(last_tick).as_secs_f64())?;
        last_tick = now;

        engine.poll();
    }

    hardware.detach(&hardware_sub);
    engine_bus.detach(&engine_sub);
    service.shutdown()?;

    for (i, track) in history.recent(10).iter().enumerate() {
        tracing::info!("History {}: {}", i + 1, track.display_name());
    }

    Ok(())
}

fn log_state_event(event: &StateEvent) {
    match event {
        StateEvent::PlaybackChanged {
            track: Some(track),
            status,
        } => tracing::info!(?status, "Now: {}", track.display_name()),
        StateEvent::StatusChanged(status) => tracing::info!(?status, "Status"),
        StateEvent::VolumeChanged(volume) => tracing::info!("Volume: {:.0}%", volume * 100.0),
        StateEvent::QueueChanged { len } => tracing::debug!(len, "Queue replaced"),
        StateEvent::PlaybackChanged { track: None, .. } | StateEvent::DurationChanged(_) => {}
    }
}

/// Collect tracks from files and directories
///
/// Directories are scanned one level deep for audio extensions and sorted by
/// path. Explicit files are taken as given, even if they do not exist, so the
/// engine gets to report them.
fn load_library(paths: &[PathBuf], track_length: Duration) -> anyhow::Result<Vec<SharedTrack>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(path)
                .with_context(|| format!("Failed to read {}", path.display()))?
                .filter_map(|entry| entry.ok().map(|entry| entry.path()))
                .filter(|file| file.is_file() && is_audio_file(file))
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }

    Ok(files
        .into_iter()
        .map(|path| {
            let mut track = Track::new(path);
            track.metadata.duration = track_length;
            Arc::new(track)
        })
        .collect())
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
