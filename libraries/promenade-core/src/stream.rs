//! Platform-agnostic audio stream contract
//!
//! The engine never decodes audio. It drives a controllable playback handle
//! supplied by the platform (Android MediaPlayer, a rodio sink, a test
//! double, ...).

use crate::error::StreamError;
use crate::types::MediaSource;

/// Callback fired by a stream when it reaches its natural end
pub type CompletionCallback = Box<dyn FnMut() + Send>;

/// A controllable playback handle for one piece of media
///
/// Implementors may do real I/O in `prepare`; everything else is expected to
/// be cheap. `stop` must be idempotent.
pub trait AudioStream: Send {
    /// Open `source` and get ready to play
    ///
    /// # Returns
    /// * `Ok(duration_ms)` - Stream is ready, paused at 0
    /// * `Err(StreamError::Open)` - Source is unplayable
    fn prepare(&mut self, source: &MediaSource) -> Result<u64, StreamError>;

    /// Start or resume output
    fn start(&mut self);

    /// Pause output, keeping position
    fn pause(&mut self);

    /// Stop output (safe if already stopped)
    fn stop(&mut self) -> Result<(), StreamError>;

    /// Free backend resources; the stream is unusable afterwards
    fn release(&mut self) -> Result<(), StreamError>;

    /// Move the play head
    fn seek_to(&mut self, position_ms: u64);

    /// Set per-side gain (0.0 - 1.0)
    fn set_volume(&mut self, left: f32, right: f32);

    /// Whether output is currently running
    fn is_playing(&self) -> bool;

    /// Current play head position
    fn current_position_ms(&self) -> u64;

    /// Register the end-of-media callback (replaces any previous one)
    fn set_on_completion(&mut self, callback: CompletionCallback);
}

/// Creates fresh, unprepared streams for the engine
pub trait StreamProvider: Send {
    fn create_stream(&self) -> Box<dyn AudioStream>;
}

impl<F> StreamProvider for F
where
    F: Fn() -> Box<dyn AudioStream> + Send,
{
    fn create_stream(&self) -> Box<dyn AudioStream> {
        self()
    }
}

/// The music and calls streams of one loaded track
///
/// Both streams are created, driven, and torn down together; the only way to
/// get rid of them is [`StreamPair::release`], which handles both.
pub(crate) struct StreamPair {
    music: Box<dyn AudioStream>,
    calls: Option<Box<dyn AudioStream>>,
}

impl StreamPair {
    pub(crate) fn new(music: Box<dyn AudioStream>, calls: Option<Box<dyn AudioStream>>) -> Self {
        Self { music, calls }
    }

    pub(crate) fn music(&self) -> &dyn AudioStream {
        self.music.as_ref()
    }

    pub(crate) fn has_calls(&self) -> bool {
        self.calls.is_some()
    }

    /// Apply `f` to every open stream
    pub(crate) fn for_each(&mut self, mut f: impl FnMut(&mut dyn AudioStream)) {
        f(self.music.as_mut());
        if let Some(calls) = self.calls.as_mut() {
            f(calls.as_mut());
        }
    }

    pub(crate) fn set_volumes(&mut self, music: f32, calls: f32) {
        self.music.set_volume(music, music);
        if let Some(stream) = self.calls.as_mut() {
            stream.set_volume(calls, calls);
        }
    }

    /// Stop then release both streams, swallowing errors
    pub(crate) fn release(mut self) {
        self.for_each(|stream| {
            if let Err(e) = stream.stop() {
                tracing::debug!("Ignoring stop error during teardown: {}", e);
            }
            if let Err(e) = stream.release() {
                tracing::debug!("Ignoring release error during teardown: {}", e);
            }
        });
    }
}

/// Stop and release a stream that never made it into a pair
pub(crate) fn discard(mut stream: Box<dyn AudioStream>) {
    if let Err(e) = stream.stop() {
        tracing::debug!("Ignoring stop error while discarding stream: {}", e);
    }
    if let Err(e) = stream.release() {
        tracing::debug!("Ignoring release error while discarding stream: {}", e);
    }
}
