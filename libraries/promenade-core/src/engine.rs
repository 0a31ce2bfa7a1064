//! Playback engine - two-stream orchestration
//!
//! Owns the music and calls streams of the loaded track and composes the
//! balance mixer, repetition tracker and auto-mute controller on top of them.
//!
//! ```text
//! Empty ──load──> Loaded(paused) ──play──> Playing
//!   ^                  ^  <──pause/complete──┘
//!   └──────stop────────┴──────────────────────┘
//! ```

use crate::{
    automute::AutoMuteController,
    config::PlayerConfig,
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    mixer::{clamp_balance, volumes_for},
    repetition::RepetitionTracker,
    stream::{self, StreamPair, StreamProvider},
    types::{AutoMuteConfig, PlaybackState, TrackDescriptor},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Called from the stream's context when the music stream completes
///
/// Receives the load generation the stream belongs to, so a late callback
/// from an already released stream can be recognised and dropped.
pub type CompletionHook = Arc<dyn Fn(u64) + Send + Sync>;

/// Result of a successful [`PlaybackEngine::load`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Music and (if the track has one) calls are open
    Full,

    /// Calls stream failed to open; only music will play
    MusicOnly {
        /// Warning shown to the user
        warning: String,
    },
}

/// Central playback engine
///
/// Not thread-safe by design: one owner drives every operation, and
/// asynchronous inputs (progress ticks, completion callbacks) are marshalled
/// onto that owner first. See [`crate::PlayerSession`].
pub struct PlaybackEngine {
    // Platform
    provider: Box<dyn StreamProvider>,
    streams: Option<StreamPair>,

    // State
    current_track: Option<Arc<TrackDescriptor>>,
    is_playing: bool,
    is_seeking: bool,
    position_ms: u64,
    duration_ms: u64,

    // Settings
    balance: f32,

    // Repetition policy
    repetition: RepetitionTracker,
    auto_mute: AutoMuteController,

    // Bumped on every load so stale completions are ignored
    generation: u64,
    completion_hook: Option<CompletionHook>,

    // Event queue for the display layer
    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackEngine {
    /// Create an empty engine
    pub fn new(provider: Box<dyn StreamProvider>, config: &PlayerConfig) -> Self {
        Self {
            provider,
            streams: None,
            current_track: None,
            is_playing: false,
            is_seeking: false,
            position_ms: 0,
            duration_ms: 0,
            balance: clamp_balance(config.initial_balance),
            repetition: RepetitionTracker::new(),
            auto_mute: AutoMuteController::new(config.auto_mute),
            generation: 0,
            completion_hook: None,
            pending_events: Vec::new(),
        }
    }

    /// Register the completion hook used for every subsequent load
    pub fn set_completion_hook(&mut self, hook: CompletionHook) {
        self.completion_hook = Some(hook);
    }

    // ===== Loading =====

    /// Load a track, paused at 0
    ///
    /// Any previous streams are stopped and released first. If the music
    /// stream fails to open the engine is left empty and `LoadFailure` is
    /// returned (and queued as an event). A failing calls stream only
    /// demotes the track to music-only.
    pub fn load(&mut self, track: Arc<TrackDescriptor>) -> Result<LoadOutcome> {
        self.teardown();
        self.generation += 1;

        let mut music = self.provider.create_stream();
        let duration_ms = match music.prepare(&track.music_source) {
            Ok(duration_ms) => duration_ms,
            Err(cause) => {
                stream::discard(music);
                let err = PlaybackError::LoadFailure {
                    track: track.name.clone(),
                    cause,
                };
                warn!("{}", err);
                self.pending_events.push(PlaybackEvent::LoadFailure {
                    message: err.to_string(),
                });
                return Err(err);
            }
        };

        let mut outcome = LoadOutcome::Full;
        let calls = match track.calls_source.as_ref() {
            None => None,
            Some(source) => {
                let mut calls = self.provider.create_stream();
                match calls.prepare(source) {
                    Ok(_) => Some(calls),
                    Err(e) => {
                        stream::discard(calls);
                        let warning =
                            format!("Calls for '{}' unavailable, playing music only: {}", track.name, e);
                        warn!("{}", warning);
                        self.pending_events.push(PlaybackEvent::PartialLoadWarning {
                            message: warning.clone(),
                        });
                        outcome = LoadOutcome::MusicOnly { warning };
                        None
                    }
                }
            }
        };

        if let Some(hook) = self.completion_hook.as_ref() {
            let hook = Arc::clone(hook);
            let generation = self.generation;
            music.set_on_completion(Box::new(move || hook(generation)));
        }

        info!(
            "Loaded '{}' ({} ms, {} repetitions, calls: {})",
            track.name,
            duration_ms,
            track.repetition_count(),
            calls.is_some()
        );

        self.streams = Some(StreamPair::new(music, calls));
        self.current_track = Some(track);
        self.duration_ms = duration_ms;
        self.position_ms = 0;
        self.repetition.reset();
        self.auto_mute.reset();

        // Covers a remaining-reps threshold equal to the full count
        self.evaluate_auto_mute();

        Ok(outcome)
    }

    // ===== Playback Control =====

    /// Start or resume playback (no-op without a track)
    pub fn play(&mut self) {
        if self.is_playing {
            return;
        }
        if self.streams.is_none() {
            return;
        }

        self.apply_volumes();
        if let Some(streams) = self.streams.as_mut() {
            streams.for_each(|s| s.start());
        }
        self.is_playing = true;
        debug!("Playback started at {} ms", self.position_ms);
    }

    /// Pause playback, freezing position sampling
    pub fn pause(&mut self) {
        if !self.is_playing {
            return;
        }
        if let Some(streams) = self.streams.as_mut() {
            streams.for_each(|s| s.pause());
        }
        self.is_playing = false;
        debug!("Playback paused at {} ms", self.position_ms);
    }

    /// Play if paused, pause if playing
    pub fn toggle_play_pause(&mut self) {
        if self.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Stop and release both streams, back to empty
    ///
    /// Idempotent.
    pub fn stop(&mut self) {
        if self.streams.is_some() {
            info!("Playback stopped");
        }
        self.teardown();
    }

    /// Final teardown; the engine cannot be used afterwards
    pub fn shutdown(self) {
        debug!("Playback engine shutting down");
        // Drop performs the teardown
    }

    // ===== Seek =====

    /// Move phase of a scrub drag: update the displayed position only
    pub fn preview_seek(&mut self, fraction: f32) {
        if self.streams.is_none() {
            return;
        }
        self.is_seeking = true;
        self.position_ms = self.target_position(fraction);
    }

    /// Commit phase of a scrub drag: seek the streams to the previewed position
    pub fn commit_seek(&mut self) {
        if self.streams.is_none() {
            return;
        }
        self.seek_to_ms(self.position_ms);
    }

    /// Seek both streams to `fraction` of the track (authoritative)
    pub fn seek(&mut self, fraction: f32) {
        if self.streams.is_none() {
            return;
        }
        let target = self.target_position(fraction);
        self.seek_to_ms(target);
    }

    fn target_position(&self, fraction: f32) -> u64 {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            f64::from(fraction.clamp(0.0, 1.0))
        };
        ((fraction * self.duration_ms as f64).round() as u64).min(self.duration_ms)
    }

    fn seek_to_ms(&mut self, position_ms: u64) {
        let position_ms = position_ms.min(self.duration_ms);
        if let Some(streams) = self.streams.as_mut() {
            streams.for_each(|s| s.seek_to(position_ms));
        }
        self.position_ms = position_ms;
        self.is_seeking = false;
        self.update_repetition();
        self.evaluate_auto_mute();
    }

    // ===== Balance & Mute =====

    /// Set the music/calls balance (clamped to [0, 1])
    ///
    /// Applied live unless the calls stream is muted; a muted balance change
    /// takes effect on unmute.
    pub fn set_balance(&mut self, balance: f32) {
        self.balance = clamp_balance(balance);
        if !self.auto_mute.is_muted() {
            self.apply_volumes();
        }
    }

    /// Mute or unmute the calls stream manually
    pub fn set_calls_muted(&mut self, muted: bool) {
        self.auto_mute.set_muted(muted);
        self.apply_volumes();
    }

    /// Toggle calls mute, returns the new state
    pub fn toggle_calls_muted(&mut self) -> bool {
        let muted = self.auto_mute.toggle_muted();
        self.apply_volumes();
        muted
    }

    /// Replace auto-mute thresholds and re-check the current repetition
    pub fn set_auto_mute_config(&mut self, config: AutoMuteConfig) {
        self.auto_mute.set_config(config);
        if self.streams.is_some() {
            self.evaluate_auto_mute();
        }
    }

    // ===== Asynchronous Inputs =====

    /// Progress tick: sample the music position while playing
    ///
    /// Returns `true` if the observable state changed.
    pub fn on_tick(&mut self) -> bool {
        if !self.is_playing || self.is_seeking {
            return false;
        }
        let Some(streams) = self.streams.as_ref() else {
            return false;
        };
        if !streams.music().is_playing() {
            return false;
        }

        let position_ms = streams.music().current_position_ms().min(self.duration_ms);
        let moved = position_ms != self.position_ms;
        self.position_ms = position_ms;

        // Thresholds are only re-checked on boundary crossings so that a
        // manual unmute holds until the next repetition starts
        if self.update_repetition() {
            self.evaluate_auto_mute();
            return true;
        }
        moved
    }

    /// Music stream reached its end
    ///
    /// Pauses the calls along with it, parks the position at the end and
    /// queues `TrackCompleted`; advancing the playlist is the navigator's job.
    pub fn on_music_completed(&mut self) {
        let Some(track) = self.current_track.as_ref() else {
            return;
        };
        let track_id = track.id.clone();
        info!("Track '{}' completed", track.name);

        if let Some(streams) = self.streams.as_mut() {
            streams.for_each(|s| s.pause());
        }
        self.is_playing = false;
        self.is_seeking = false;
        self.position_ms = self.duration_ms;
        self.update_repetition();
        self.pending_events
            .push(PlaybackEvent::TrackCompleted { track_id });
    }

    /// Completion tagged with a load generation
    ///
    /// Returns `false` (and does nothing) for a stale generation.
    pub fn on_music_completed_for(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.streams.is_none() {
            debug!("Ignoring completion from stale stream generation {}", generation);
            return false;
        }
        self.on_music_completed();
        true
    }

    // ===== State Queries =====

    /// Snapshot of the observable state
    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            current_track: self.current_track.clone(),
            calls_available: self.streams.as_ref().is_some_and(StreamPair::has_calls),
            is_playing: self.is_playing,
            is_seeking: self.is_seeking,
            position_ms: self.position_ms,
            duration_ms: self.duration_ms,
            balance: self.balance,
            calls_muted: self.auto_mute.is_muted(),
            current_repetition: self.repetition.current(),
        }
    }

    pub fn current_track(&self) -> Option<&Arc<TrackDescriptor>> {
        self.current_track.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.streams.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_seeking(&self) -> bool {
        self.is_seeking
    }

    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn balance(&self) -> f32 {
        self.balance
    }

    pub fn calls_muted(&self) -> bool {
        self.auto_mute.is_muted()
    }

    pub fn current_repetition(&self) -> usize {
        self.repetition.current()
    }

    pub fn auto_mute_config(&self) -> AutoMuteConfig {
        self.auto_mute.config()
    }

    /// Generation of the currently loaded streams
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ===== Events =====

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internal =====

    /// Returns `true` if the repetition index changed
    fn update_repetition(&mut self) -> bool {
        let boundaries = self
            .current_track
            .as_ref()
            .map_or(&[][..], |track| track.repetitions.as_slice());
        self.repetition.update(self.position_ms, boundaries)
    }

    fn evaluate_auto_mute(&mut self) {
        let total = self
            .current_track
            .as_ref()
            .map_or(0, |track| track.repetition_count());
        let repetition = self.repetition.current();
        let was_muted = self.auto_mute.is_muted();

        if self.auto_mute.evaluate(repetition, total) && !was_muted {
            info!("Auto-muting calls at repetition {} of {}", repetition, total);
            self.pending_events
                .push(PlaybackEvent::CallsAutoMuted { repetition });
        }
        self.apply_volumes();
    }

    /// Push balance-derived volumes to the streams, silencing calls if muted
    fn apply_volumes(&mut self) {
        let Some(streams) = self.streams.as_mut() else {
            return;
        };
        let mut volumes = volumes_for(self.balance);
        if self.auto_mute.is_muted() {
            volumes = volumes.with_calls_silenced();
        }
        streams.set_volumes(volumes.music, volumes.calls);
    }

    /// Release streams and reset playback fields (balance and thresholds stay)
    fn teardown(&mut self) {
        if let Some(streams) = self.streams.take() {
            streams.release();
        }
        self.current_track = None;
        self.is_playing = false;
        self.is_seeking = false;
        self.position_ms = 0;
        self.duration_ms = 0;
        self.repetition.reset();
        self.auto_mute.reset();
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("state", &self.state())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
