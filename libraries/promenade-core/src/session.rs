//! Player session - single-owner playback thread
//!
//! All engine and navigator state lives on one thread. User commands,
//! progress ticks and stream completions are funnelled through a single
//! queue, so every mutation is serialized and observers only ever see
//! complete [`SessionUpdate`] snapshots.

use crate::{
    clock::ProgressClock,
    config::PlayerConfig,
    engine::PlaybackEngine,
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    navigator::PlaylistNavigator,
    stream::StreamProvider,
    types::{AutoMuteConfig, NavigationState, PlaybackState, PlaylistDescriptor, TrackCatalog},
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Commands accepted by the session thread
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Replace the track catalog (stops playback, clears the playlist)
    SetCatalog(TrackCatalog),

    /// Select a playlist, or clear the selection
    SelectPlaylist(Option<PlaylistDescriptor>),

    /// Play the entry at an index of the active playlist
    PlayAt(usize),

    /// Skip to the next playable entry
    Next,

    /// Go back to the previous playable entry
    Previous,

    /// Start or resume playback
    Play,

    /// Pause playback
    Pause,

    /// Toggle between play and pause
    TogglePlayPause,

    /// Stop and release the loaded track
    Stop,

    /// Scrub drag in progress (fraction 0.0 - 1.0)
    PreviewSeek(f32),

    /// Scrub drag released at the previewed position
    CommitSeek,

    /// Seek immediately (fraction 0.0 - 1.0)
    Seek(f32),

    /// Set music/calls balance (0.0 - 1.0)
    SetBalance(f32),

    /// Mute or unmute calls
    SetCallsMuted(bool),

    /// Toggle calls mute
    ToggleCallsMuted,

    /// Replace auto-mute thresholds
    SetAutoMute(AutoMuteConfig),

    /// Publish the current state without changing anything
    Refresh,
}

/// Snapshot published after every state change
#[derive(Debug, Clone)]
pub struct SessionUpdate {
    pub playback: PlaybackState,
    pub navigation: NavigationState,

    /// Events raised since the previous update
    pub events: Vec<PlaybackEvent>,
}

enum Message {
    Command(SessionCommand),
    Tick(u64),
    MusicCompleted(u64),
    Shutdown,
}

/// Handle to the session thread
///
/// Dropping the handle shuts the session down and waits for it.
pub struct PlayerSession {
    message_tx: Sender<Message>,
    update_rx: Receiver<SessionUpdate>,
    thread: Option<JoinHandle<()>>,
}

impl PlayerSession {
    /// Spawn the session thread
    ///
    /// An initial update with the empty state is published right away.
    pub fn spawn(
        provider: Box<dyn StreamProvider>,
        catalog: TrackCatalog,
        config: PlayerConfig,
    ) -> Result<Self> {
        let config = config.normalized();
        let (message_tx, message_rx) = unbounded();
        let (update_tx, update_rx) = unbounded();

        let mut engine = PlaybackEngine::new(provider, &config);
        let completion_tx = message_tx.clone();
        engine.set_completion_hook(Arc::new(move |generation| {
            let _ = completion_tx.send(Message::MusicCompleted(generation));
        }));

        let worker = Worker {
            engine,
            navigator: PlaylistNavigator::new(),
            catalog,
            clock: ProgressClock::new(config.tick_interval()),
            message_tx: message_tx.clone(),
            update_tx,
        };

        let thread = thread::Builder::new()
            .name("promenade-session".to_string())
            .spawn(move || worker.run(&message_rx))?;

        Ok(Self {
            message_tx,
            update_rx,
            thread: Some(thread),
        })
    }

    /// Send a command to the session thread
    pub fn send(&self, command: SessionCommand) -> Result<()> {
        self.message_tx
            .send(Message::Command(command))
            .map_err(|_| PlaybackError::SessionClosed)
    }

    /// Update stream
    pub fn updates(&self) -> &Receiver<SessionUpdate> {
        &self.update_rx
    }

    /// Try to receive the next update (non-blocking)
    pub fn try_recv_update(&self) -> Option<SessionUpdate> {
        self.update_rx.try_recv().ok()
    }

    /// Receive the next update, waiting at most `timeout`
    pub fn recv_update_timeout(&self, timeout: Duration) -> Option<SessionUpdate> {
        self.update_rx.recv_timeout(timeout).ok()
    }

    // ===== Convenience =====

    pub fn set_catalog(&self, catalog: TrackCatalog) -> Result<()> {
        self.send(SessionCommand::SetCatalog(catalog))
    }

    pub fn select_playlist(&self, playlist: Option<PlaylistDescriptor>) -> Result<()> {
        self.send(SessionCommand::SelectPlaylist(playlist))
    }

    pub fn play_at(&self, index: usize) -> Result<()> {
        self.send(SessionCommand::PlayAt(index))
    }

    pub fn next(&self) -> Result<()> {
        self.send(SessionCommand::Next)
    }

    pub fn previous(&self) -> Result<()> {
        self.send(SessionCommand::Previous)
    }

    pub fn play(&self) -> Result<()> {
        self.send(SessionCommand::Play)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(SessionCommand::Pause)
    }

    pub fn toggle_play_pause(&self) -> Result<()> {
        self.send(SessionCommand::TogglePlayPause)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(SessionCommand::Stop)
    }

    pub fn preview_seek(&self, fraction: f32) -> Result<()> {
        self.send(SessionCommand::PreviewSeek(fraction))
    }

    pub fn commit_seek(&self) -> Result<()> {
        self.send(SessionCommand::CommitSeek)
    }

    pub fn seek(&self, fraction: f32) -> Result<()> {
        self.send(SessionCommand::Seek(fraction))
    }

    pub fn set_balance(&self, balance: f32) -> Result<()> {
        self.send(SessionCommand::SetBalance(balance))
    }

    pub fn set_calls_muted(&self, muted: bool) -> Result<()> {
        self.send(SessionCommand::SetCallsMuted(muted))
    }

    pub fn toggle_calls_muted(&self) -> Result<()> {
        self.send(SessionCommand::ToggleCallsMuted)
    }

    pub fn set_auto_mute(&self, config: AutoMuteConfig) -> Result<()> {
        self.send(SessionCommand::SetAutoMute(config))
    }

    /// Stop playback, release streams and join the session thread
    pub fn shutdown(mut self) -> Result<()> {
        self.close()
    }

    fn close(&mut self) -> Result<()> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        // The thread may already be gone; joining still reports a panic
        let _ = self.message_tx.send(Message::Shutdown);
        thread.join().map_err(|_| PlaybackError::SessionClosed)
    }
}

impl Drop for PlayerSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Session shutdown failed: {}", e);
        }
    }
}

/// State owned by the session thread
struct Worker {
    engine: PlaybackEngine,
    navigator: PlaylistNavigator,
    catalog: TrackCatalog,
    clock: ProgressClock,
    message_tx: Sender<Message>,
    update_tx: Sender<SessionUpdate>,
}

impl Worker {
    fn run(mut self, messages: &Receiver<Message>) {
        info!("Playback session started ({} tracks)", self.catalog.len());
        self.publish();

        while let Ok(message) = messages.recv() {
            let changed = match message {
                Message::Shutdown => break,
                Message::Command(command) => {
                    if let Err(e) = self.handle(command) {
                        // Already queued as an event for the display layer
                        debug!("Command failed: {}", e);
                    }
                    true
                }
                Message::Tick(generation) => {
                    self.clock.is_running()
                        && generation == self.clock.generation()
                        && self.engine.on_tick()
                }
                Message::MusicCompleted(generation) => self.on_music_completed(generation),
            };

            self.reconcile_clock();
            if changed {
                self.publish();
            }
        }

        self.clock.stop();
        self.engine.shutdown();
        info!("Playback session stopped");
    }

    fn handle(&mut self, command: SessionCommand) -> Result<()> {
        debug!("Session command: {:?}", command);
        match command {
            SessionCommand::SetCatalog(catalog) => {
                self.engine.stop();
                self.navigator.clear();
                self.catalog = catalog;
                info!("Catalog replaced ({} tracks)", self.catalog.len());
            }
            SessionCommand::SelectPlaylist(playlist) => {
                self.navigator
                    .select(playlist.as_ref(), &self.catalog, &mut self.engine)?;
            }
            SessionCommand::PlayAt(index) => {
                self.navigator.play_at(index, &mut self.engine)?;
            }
            SessionCommand::Next => {
                self.navigator.next(&mut self.engine)?;
            }
            SessionCommand::Previous => {
                self.navigator.previous(&mut self.engine)?;
            }
            SessionCommand::Play => self.engine.play(),
            SessionCommand::Pause => self.engine.pause(),
            SessionCommand::TogglePlayPause => self.engine.toggle_play_pause(),
            SessionCommand::Stop => self.engine.stop(),
            SessionCommand::PreviewSeek(fraction) => self.engine.preview_seek(fraction),
            SessionCommand::CommitSeek => self.engine.commit_seek(),
            SessionCommand::Seek(fraction) => self.engine.seek(fraction),
            SessionCommand::SetBalance(balance) => self.engine.set_balance(balance),
            SessionCommand::SetCallsMuted(muted) => self.engine.set_calls_muted(muted),
            SessionCommand::ToggleCallsMuted => {
                self.engine.toggle_calls_muted();
            }
            SessionCommand::SetAutoMute(config) => self.engine.set_auto_mute_config(config),
            SessionCommand::Refresh => {}
        }
        Ok(())
    }

    fn on_music_completed(&mut self, generation: u64) -> bool {
        if !self.engine.on_music_completed_for(generation) {
            return false;
        }
        if let Err(e) = self.navigator.on_track_completed(&mut self.engine) {
            debug!("Auto-advance failed: {}", e);
        }
        true
    }

    /// Run the clock exactly while playing and not scrubbing
    fn reconcile_clock(&mut self) {
        let should_run = self.engine.is_playing() && !self.engine.is_seeking();

        if should_run && !self.clock.is_running() {
            let tick_tx = self.message_tx.clone();
            if let Err(e) = self
                .clock
                .start(move |generation| tick_tx.send(Message::Tick(generation)).is_ok())
            {
                warn!("Failed to start progress clock: {}", e);
            }
        } else if !should_run && self.clock.is_running() {
            self.clock.stop();
        }
    }

    fn publish(&mut self) {
        let mut events = self.navigator.drain_events();
        events.extend(self.engine.drain_events());

        let update = SessionUpdate {
            playback: self.engine.state(),
            navigation: self.navigator.state().clone(),
            events,
        };
        if self.update_tx.send(update).is_err() {
            debug!("No update receiver, dropping update");
        }
    }
}
