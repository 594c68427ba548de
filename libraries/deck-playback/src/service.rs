//! Single-writer playback actor
//!
//! The controller is moved onto a dedicated thread that drains a bounded
//! command mailbox and an unbounded event channel. The UI, hardware and
//! engine threads only ever send messages, so controller operations never
//! interleave.
//!
//! Engines may publish from inside `play`/`stop` on the playback thread
//! itself, so bus adapters feed the event channel, never the mailbox.

use crate::bus::{ChannelSubscriber, Subscriber};
use crate::config::ServiceSettings;
use crate::controller::PlaybackController;
use crate::error::{PlaybackError, Result};
use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender, TrySendError};
use deck_core::{EngineEvent, HardwareEvent, RepeatMode, SharedTrack, TrackList};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Reply channel for commands that report success
pub type Reply = Sender<bool>;

/// Messages processed by the playback thread
pub enum PlaybackCommand {
    /// Play a track, optionally pushing the current one onto the back-stack
    Play {
        track: SharedTrack,
        push_to_stack: bool,
        reply: Option<Reply>,
    },

    /// Replace the queue and start at `start_index`
    PlayContext {
        tracks: Vec<SharedTrack>,
        start_index: usize,
        reply: Option<Reply>,
    },

    /// Skip to next track
    Next { reply: Option<Reply> },

    /// Go to previous track
    Previous { reply: Option<Reply> },

    Pause,
    Resume,
    Stop,

    /// Seek to position (in seconds)
    Seek(f64),

    /// Set volume (0.0 - 1.0)
    SetVolume(f32),

    /// Frame tick (elapsed seconds)
    Tick(f64),

    ToggleRepeatMode,
    SetRepeatMode(RepeatMode),

    /// Enter playlist mode (`Some`) or queue mode (`None`)
    SetCurrentPlaylist(Option<Arc<dyn TrackList>>),

    /// Stop the playback thread
    Shutdown,
}

impl PlaybackCommand {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Play { .. } => "play",
            Self::PlayContext { .. } => "play_context",
            Self::Next { .. } => "next",
            Self::Previous { .. } => "previous",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Stop => "stop",
            Self::Seek(_) => "seek",
            Self::SetVolume(_) => "set_volume",
            Self::Tick(_) => "tick",
            Self::ToggleRepeatMode => "toggle_repeat_mode",
            Self::SetRepeatMode(_) => "set_repeat_mode",
            Self::SetCurrentPlaylist(_) => "set_current_playlist",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Bus notifications delivered to the playback thread
#[derive(Debug, Clone)]
pub enum PlaybackEvent {
    /// Hardware control surface event
    Hardware(HardwareEvent),

    /// Playback engine notification
    Engine(EngineEvent),
}

/// Running playback actor
///
/// Owns the playback thread. Dropping the service shuts the thread down.
pub struct PlaybackService {
    handle: PlaybackHandle,
    thread: Option<JoinHandle<PlaybackController>>,
}

impl PlaybackService {
    /// Move `controller` onto a new playback thread
    ///
    /// # Returns
    /// * `Ok(service)` - Thread running, mailbox open
    /// * `Err(_)` - Invalid mailbox capacity or the thread could not start
    pub fn spawn(controller: PlaybackController, settings: &ServiceSettings) -> Result<Self> {
        if settings.mailbox_capacity == 0 {
            return Err(PlaybackError::Config(
                "service.mailbox_capacity must be greater than 0".into(),
            ));
        }

        let (command_tx, command_rx) = bounded(settings.mailbox_capacity);
        let (event_tx, event_rx) = unbounded();

        let thread = thread::Builder::new()
            .name("deck-playback".into())
            .spawn(move || run(controller, &command_rx, &event_rx))?;

        info!(capacity = settings.mailbox_capacity, "Playback service started");

        Ok(Self {
            handle: PlaybackHandle {
                command_tx,
                event_tx,
                pending_tick: Arc::new(Mutex::new(0.0)),
            },
            thread: Some(thread),
        })
    }

    /// Cloneable sender for this service
    pub fn handle(&self) -> PlaybackHandle {
        self.handle.clone()
    }

    /// Request shutdown and wait for the thread
    pub fn shutdown(self) -> Result<PlaybackController> {
        // Already stopped is fine; join reports the outcome
        self.handle.shutdown().ok();
        self.join()
    }

    /// Wait for the playback thread to exit and take the controller back
    ///
    /// Only returns once some handle has sent `Shutdown`.
    pub fn join(mut self) -> Result<PlaybackController> {
        let thread = self.thread.take().ok_or(PlaybackError::ServiceStopped)?;
        thread.join().map_err(|_| PlaybackError::Panicked)
    }
}

impl Drop for PlaybackService {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.handle.shutdown().ok();
            if thread.join().is_err() {
                warn!("Playback thread panicked");
            }
        }
    }
}

fn run(
    mut controller: PlaybackController,
    command_rx: &Receiver<PlaybackCommand>,
    event_rx: &Receiver<PlaybackEvent>,
) -> PlaybackController {
    loop {
        let command = select! {
            recv(event_rx) -> event => match event {
                Ok(event) => {
                    process_event(&mut controller, event);
                    continue;
                }
                // Every publisher is gone; commands may still be queued
                Err(_) => command_rx.recv(),
            },
            recv(command_rx) -> command => command,
        };

        let Ok(command) = command else {
            break;
        };

        if !matches!(command, PlaybackCommand::Tick(_)) {
            debug!(command = command.name(), "Processing command");
        }

        if !process_command(&mut controller, command) {
            // Notifications published before the shutdown still apply
            for event in event_rx.try_iter() {
                process_event(&mut controller, event);
            }
            break;
        }
    }

    info!("Playback service stopped");
    controller
}

fn process_event(controller: &mut PlaybackController, event: PlaybackEvent) {
    match event {
        PlaybackEvent::Hardware(event) => controller.handle_hardware_event(event),
        PlaybackEvent::Engine(event) => controller.handle_engine_event(event),
    }
}

/// Apply one command; `false` stops the loop
fn process_command(controller: &mut PlaybackController, command: PlaybackCommand) -> bool {
    match command {
        PlaybackCommand::Play {
            track,
            push_to_stack,
            reply,
        } => {
            let started = controller.play_with(track, push_to_stack);
            send_reply(reply, started);
        }
        PlaybackCommand::PlayContext {
            tracks,
            start_index,
            reply,
        } => {
            let started = controller.play_context(tracks, start_index);
            send_reply(reply, started);
        }
        PlaybackCommand::Next { reply } => {
            let moved = controller.next();
            send_reply(reply, moved);
        }
        PlaybackCommand::Previous { reply } => {
            let moved = controller.previous();
            send_reply(reply, moved);
        }
        PlaybackCommand::Pause => controller.pause(),
        PlaybackCommand::Resume => controller.resume(),
        PlaybackCommand::Stop => controller.stop(),
        PlaybackCommand::Seek(position) => controller.seek(position),
        PlaybackCommand::SetVolume(volume) => controller.set_volume(volume),
        PlaybackCommand::Tick(delta) => controller.update_time(delta),
        PlaybackCommand::ToggleRepeatMode => {
            controller.toggle_repeat_mode();
        }
        PlaybackCommand::SetRepeatMode(mode) => controller.set_repeat_mode(mode),
        PlaybackCommand::SetCurrentPlaylist(playlist) => controller.set_current_playlist(playlist),
        PlaybackCommand::Shutdown => return false,
    }

    true
}

fn send_reply(reply: Option<Reply>, value: bool) {
    if let Some(reply) = reply {
        // Caller may have given up waiting
        reply.send(value).ok();
    }
}

/// Cloneable sender into the playback thread
#[derive(Clone)]
pub struct PlaybackHandle {
    command_tx: Sender<PlaybackCommand>,
    event_tx: Sender<PlaybackEvent>,
    // Seconds from ticks that found the mailbox full, shared by all clones
    pending_tick: Arc<Mutex<f64>>,
}

impl PlaybackHandle {
    /// Send a raw command
    pub fn send(&self, command: PlaybackCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| PlaybackError::ServiceStopped)
    }

    fn request(&self, build: impl FnOnce(Reply) -> PlaybackCommand) -> Result<bool> {
        let (reply_tx, reply_rx) = bounded(1);
        self.send(build(reply_tx))?;
        reply_rx.recv().map_err(|_| PlaybackError::ServiceStopped)
    }

    /// Play `track`, pushing the current one onto the back-stack
    pub fn play(&self, track: SharedTrack) -> Result<bool> {
        self.request(|reply| PlaybackCommand::Play {
            track,
            push_to_stack: true,
            reply: Some(reply),
        })
    }

    pub fn play_context(&self, tracks: Vec<SharedTrack>, start_index: usize) -> Result<bool> {
        self.request(|reply| PlaybackCommand::PlayContext {
            tracks,
            start_index,
            reply: Some(reply),
        })
    }

    pub fn next(&self) -> Result<bool> {
        self.request(|reply| PlaybackCommand::Next { reply: Some(reply) })
    }

    pub fn previous(&self) -> Result<bool> {
        self.request(|reply| PlaybackCommand::Previous { reply: Some(reply) })
    }

    pub fn pause(&self) -> Result<()> {
        self.send(PlaybackCommand::Pause)
    }

    pub fn resume(&self) -> Result<()> {
        self.send(PlaybackCommand::Resume)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(PlaybackCommand::Stop)
    }

    pub fn seek(&self, position_secs: f64) -> Result<()> {
        self.send(PlaybackCommand::Seek(position_secs))
    }

    pub fn set_volume(&self, volume: f32) -> Result<()> {
        self.send(PlaybackCommand::SetVolume(volume))
    }

    /// Frame tick
    ///
    /// Never blocks. When the mailbox is full the elapsed time is kept and
    /// folded into the next tick that gets through.
    ///
    /// # Returns
    /// * `Ok(true)` - Delivered, including any time held back earlier
    /// * `Ok(false)` - Mailbox full, time held back
    pub fn tick(&self, delta_secs: f64) -> Result<bool> {
        let mut pending = self
            .pending_tick
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let total = *pending + delta_secs;

        match self.command_tx.try_send(PlaybackCommand::Tick(total)) {
            Ok(()) => {
                *pending = 0.0;
                Ok(true)
            }
            Err(TrySendError::Full(_)) => {
                *pending = total;
                Ok(false)
            }
            Err(TrySendError::Disconnected(_)) => Err(PlaybackError::ServiceStopped),
        }
    }

    pub fn toggle_repeat_mode(&self) -> Result<()> {
        self.send(PlaybackCommand::ToggleRepeatMode)
    }

    pub fn set_repeat_mode(&self, mode: RepeatMode) -> Result<()> {
        self.send(PlaybackCommand::SetRepeatMode(mode))
    }

    pub fn set_current_playlist(&self, playlist: Option<Arc<dyn TrackList>>) -> Result<()> {
        self.send(PlaybackCommand::SetCurrentPlaylist(playlist))
    }

    /// Queue a bus notification; never blocks
    pub fn notify(&self, event: PlaybackEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .map_err(|_| PlaybackError::ServiceStopped)
    }

    pub fn hardware_event(&self, event: HardwareEvent) -> Result<()> {
        self.notify(PlaybackEvent::Hardware(event))
    }

    pub fn engine_event(&self, event: EngineEvent) -> Result<()> {
        self.notify(PlaybackEvent::Engine(event))
    }

    /// Ask the playback thread to exit after the commands already queued
    pub fn shutdown(&self) -> Result<()> {
        self.send(PlaybackCommand::Shutdown)
    }

    /// Adapter for a hardware `EventBus`
    pub fn hardware_subscriber(&self) -> Arc<dyn Subscriber<HardwareEvent>> {
        Arc::new(ChannelSubscriber::mapped(
            self.event_tx.clone(),
            |event: &HardwareEvent| PlaybackEvent::Hardware(*event),
        ))
    }

    /// Adapter for an engine `EventBus`
    ///
    /// Safe to publish on from inside engine calls made by the playback
    /// thread.
    pub fn engine_subscriber(&self) -> Arc<dyn Subscriber<EngineEvent>> {
        Arc::new(ChannelSubscriber::mapped(
            self.event_tx.clone(),
            |event: &EngineEvent| PlaybackEvent::Engine(event.clone()),
        ))
    }
}
