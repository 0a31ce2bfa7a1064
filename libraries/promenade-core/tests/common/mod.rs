//! Shared test doubles for the playback core

#![allow(dead_code)]

use promenade_core::{
    AudioStream, CompletionCallback, MediaSource, StreamError, StreamProvider, TrackDescriptor,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, Once};

static INIT: Once = Once::new();

/// Initialize logging once per test binary
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

pub const DURATION_MS: u64 = 120_000;

/// Observable state of one mock stream
#[derive(Debug, Clone, Default)]
pub struct StreamState {
    pub source: Option<PathBuf>,
    pub playing: bool,
    pub position_ms: u64,
    pub volume: (f32, f32),
    pub starts: usize,
    pub seeks: Vec<u64>,
    pub stopped: bool,
    pub released: bool,
}

/// Test-side handle to a stream the provider created
#[derive(Clone)]
pub struct StreamHandle {
    state: Arc<Mutex<StreamState>>,
    completion: Arc<Mutex<Option<CompletionCallback>>>,
}

impl StreamHandle {
    pub fn snapshot(&self) -> StreamState {
        self.state.lock().unwrap().clone()
    }

    /// Simulate playback progress
    pub fn set_position(&self, position_ms: u64) {
        self.state.lock().unwrap().position_ms = position_ms;
    }

    /// Simulate reaching the end of the media
    pub fn complete(&self) {
        self.state.lock().unwrap().playing = false;
        if let Some(callback) = self.completion.lock().unwrap().as_mut() {
            callback();
        }
    }

    pub fn source_contains(&self, needle: &str) -> bool {
        self.snapshot()
            .source
            .is_some_and(|source| source.to_string_lossy().contains(needle))
    }
}

/// Mock stream that records every call
pub struct MockStream {
    handle: StreamHandle,
    failing: Vec<String>,
    duration_ms: u64,
}

impl AudioStream for MockStream {
    fn prepare(&mut self, source: &MediaSource) -> Result<u64, StreamError> {
        let path = source.path().to_string_lossy().to_string();
        if self.failing.iter().any(|needle| path.contains(needle.as_str())) {
            return Err(StreamError::open(path, "unsupported format"));
        }
        self.handle.state.lock().unwrap().source = Some(source.path().to_path_buf());
        Ok(self.duration_ms)
    }

    fn start(&mut self) {
        let mut state = self.handle.state.lock().unwrap();
        state.playing = true;
        state.starts += 1;
    }

    fn pause(&mut self) {
        self.handle.state.lock().unwrap().playing = false;
    }

    fn stop(&mut self) -> Result<(), StreamError> {
        let mut state = self.handle.state.lock().unwrap();
        state.playing = false;
        state.stopped = true;
        Ok(())
    }

    fn release(&mut self) -> Result<(), StreamError> {
        self.handle.state.lock().unwrap().released = true;
        Ok(())
    }

    fn seek_to(&mut self, position_ms: u64) {
        let mut state = self.handle.state.lock().unwrap();
        state.position_ms = position_ms;
        state.seeks.push(position_ms);
    }

    fn set_volume(&mut self, left: f32, right: f32) {
        self.handle.state.lock().unwrap().volume = (left, right);
    }

    fn is_playing(&self) -> bool {
        self.handle.state.lock().unwrap().playing
    }

    fn current_position_ms(&self) -> u64 {
        self.handle.state.lock().unwrap().position_ms
    }

    fn set_on_completion(&mut self, callback: CompletionCallback) {
        *self.handle.completion.lock().unwrap() = Some(callback);
    }
}

/// Provider that keeps a handle to every stream it creates
#[derive(Clone, Default)]
pub struct MockProvider {
    streams: Arc<Mutex<Vec<StreamHandle>>>,
    failing: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `prepare` fail for sources whose path contains `needle`
    pub fn fail_on(&self, needle: &str) {
        self.failing.lock().unwrap().push(needle.to_string());
    }

    pub fn created(&self) -> usize {
        self.streams.lock().unwrap().len()
    }

    pub fn streams(&self) -> Vec<StreamHandle> {
        self.streams.lock().unwrap().clone()
    }

    /// Most recently created stream prepared from a path containing `needle`
    pub fn stream_for(&self, needle: &str) -> StreamHandle {
        self.streams()
            .into_iter()
            .rev()
            .find(|handle| handle.source_contains(needle))
            .unwrap_or_else(|| panic!("no stream prepared for {needle}"))
    }

    /// Streams that were created but not released
    pub fn live_streams(&self) -> usize {
        self.streams()
            .iter()
            .filter(|handle| !handle.snapshot().released)
            .count()
    }
}

impl StreamProvider for MockProvider {
    fn create_stream(&self) -> Box<dyn AudioStream> {
        let handle = StreamHandle {
            state: Arc::new(Mutex::new(StreamState::default())),
            completion: Arc::new(Mutex::new(None)),
        };
        self.streams.lock().unwrap().push(handle.clone());
        Box::new(MockStream {
            handle,
            failing: self.failing.lock().unwrap().clone(),
            duration_ms: DURATION_MS,
        })
    }
}

/// Track with music, calls and repetition boundaries (seconds)
pub fn track(id: &str, repetitions: &[f64]) -> TrackDescriptor {
    TrackDescriptor::new(
        format!("{id}.json"),
        id.to_uppercase(),
        MediaSource::new(format!("/tracks/{id}.mp3")),
    )
    .with_calls(MediaSource::new(format!("/tracks/{id}-calls.mp3")))
    .with_repetitions(repetitions.to_vec())
}

/// Track with music only
pub fn music_only(id: &str) -> TrackDescriptor {
    TrackDescriptor::new(
        format!("{id}.json"),
        id.to_uppercase(),
        MediaSource::new(format!("/tracks/{id}.mp3")),
    )
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}
