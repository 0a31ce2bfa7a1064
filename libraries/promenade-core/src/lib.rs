//! Promenade - Playback Core
//!
//! Platform-agnostic playback engine for square dance practice tracks.
//!
//! A track is a music recording plus an optional, time-aligned "calls"
//! recording. This crate provides:
//! - Two-stream playback kept in lockstep (play, pause, seek, stop)
//! - Equal-power music/calls balance
//! - Repetition tracking from timestamped boundaries
//! - Auto-mute of the calls after N repetitions, or with N remaining
//! - Playlist navigation with unresolved-entry skipping and auto-advance
//! - A single-owner session thread with a progress clock
//!
//! # Architecture
//!
//! `promenade-core` never decodes audio. The platform supplies controllable
//! streams through [`AudioStream`] and [`StreamProvider`]; storage and file
//! formats live in `promenade-catalog`.
//!
//! # Example: Driving the engine directly
//!
//! ```rust,no_run
//! use promenade_core::{
//!     AudioStream, CompletionCallback, MediaSource, PlaybackEngine, PlayerConfig,
//!     StreamError, TrackDescriptor,
//! };
//! use std::sync::Arc;
//!
//! // Implement AudioStream for your platform
//! #[derive(Default)]
//! struct MyStream {
//!     playing: bool,
//! }
//!
//! impl AudioStream for MyStream {
//!     fn prepare(&mut self, _source: &MediaSource) -> Result<u64, StreamError> {
//!         Ok(180_000)
//!     }
//!     fn start(&mut self) {
//!         self.playing = true;
//!     }
//!     fn pause(&mut self) {
//!         self.playing = false;
//!     }
//!     fn stop(&mut self) -> Result<(), StreamError> {
//!         self.playing = false;
//!         Ok(())
//!     }
//!     fn release(&mut self) -> Result<(), StreamError> {
//!         Ok(())
//!     }
//!     fn seek_to(&mut self, _position_ms: u64) {}
//!     fn set_volume(&mut self, _left: f32, _right: f32) {}
//!     fn is_playing(&self) -> bool {
//!         self.playing
//!     }
//!     fn current_position_ms(&self) -> u64 {
//!         0
//!     }
//!     fn set_on_completion(&mut self, _callback: CompletionCallback) {}
//! }
//!
//! let provider = || Box::new(MyStream::default()) as Box<dyn AudioStream>;
//! let mut engine = PlaybackEngine::new(Box::new(provider), &PlayerConfig::default());
//!
//! let track = TrackDescriptor::new("plus.json", "Plus Singing Call", MediaSource::new("/tracks/plus.mp3"))
//!     .with_calls(MediaSource::new("/tracks/plus-calls.mp3"))
//!     .with_repetitions(vec![30.0, 62.5, 95.0]);
//!
//! engine.load(Arc::new(track)).ok();
//! engine.set_balance(0.25);
//! engine.play();
//! ```

mod automute;
mod clock;
mod config;
mod engine;
mod error;
mod events;
mod mixer;
mod navigator;
mod repetition;
mod session;
mod stream;
pub mod types;

// Public exports
pub use automute::AutoMuteController;
pub use clock::ProgressClock;
pub use config::{PlayerConfig, MAX_TICK_INTERVAL_MS, MIN_TICK_INTERVAL_MS};
pub use engine::{CompletionHook, LoadOutcome, PlaybackEngine};
pub use error::{PlaybackError, Result, StreamError};
pub use events::PlaybackEvent;
pub use mixer::{clamp_balance, volumes_for, ChannelVolumes};
pub use navigator::PlaylistNavigator;
pub use repetition::{repetition_at, RepetitionTracker};
pub use session::{PlayerSession, SessionCommand, SessionUpdate};
pub use stream::{AudioStream, CompletionCallback, StreamProvider};
pub use types::{
    format_clock, AutoMuteConfig, MediaSource, NavigationState, PlaybackState, PlaylistDescriptor,
    ResolvedEntry, ResolvedPlaylist, TrackCatalog, TrackDescriptor, TrackId,
};
