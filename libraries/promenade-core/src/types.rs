//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Track identifier (the descriptor's file name within the catalog folder)
pub type TrackId = String;

/// Opaque handle to a piece of media the audio backend knows how to open
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaSource(PathBuf);

impl MediaSource {
    /// Wrap a path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Underlying path
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// One practice track: music, optional calls, and its repetition markers
///
/// Immutable once loaded. Shared between the catalog and the engine through
/// `Arc`, so the engine never copies descriptors.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackDescriptor {
    /// Identifier playlists refer to
    pub id: TrackId,

    /// Display name
    pub name: String,

    /// Music stream source
    pub music_source: MediaSource,

    /// Synchronized calls stream source (optional)
    pub calls_source: Option<MediaSource>,

    /// Free-form intro description ("8 bars", "long chord", ...)
    pub intro: String,

    /// Repetition start times in seconds, non-decreasing
    pub repetitions: Vec<f64>,
}

impl TrackDescriptor {
    /// Create a music-only track without repetition markers
    pub fn new(id: impl Into<TrackId>, name: impl Into<String>, music_source: MediaSource) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            music_source,
            calls_source: None,
            intro: String::new(),
            repetitions: Vec::new(),
        }
    }

    /// Attach a calls stream
    #[must_use]
    pub fn with_calls(mut self, calls_source: MediaSource) -> Self {
        self.calls_source = Some(calls_source);
        self
    }

    /// Set the intro text
    #[must_use]
    pub fn with_intro(mut self, intro: impl Into<String>) -> Self {
        self.intro = intro.into();
        self
    }

    /// Set repetition start times (seconds)
    #[must_use]
    pub fn with_repetitions(mut self, repetitions: Vec<f64>) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Number of repetitions in the track
    pub fn repetition_count(&self) -> usize {
        self.repetitions.len()
    }

    /// Check that repetition starts never decrease
    pub fn repetitions_ordered(&self) -> bool {
        self.repetitions.windows(2).all(|pair| pair[0] <= pair[1])
    }
}

/// A saved playlist: ordered track identifiers, duplicates allowed
///
/// Edits return a new value; persisting it is the catalog's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistDescriptor {
    /// Display name
    pub name: String,

    /// Identifies the persisted file
    pub storage_key: String,

    /// Track identifiers in play order
    pub entries: Vec<TrackId>,
}

impl PlaylistDescriptor {
    /// Create an empty playlist
    pub fn new(name: impl Into<String>, storage_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage_key: storage_key.into(),
            entries: Vec::new(),
        }
    }

    /// Copy with `track_id` appended
    #[must_use]
    pub fn with_entry(&self, track_id: impl Into<TrackId>) -> Self {
        let mut next = self.clone();
        next.entries.push(track_id.into());
        next
    }

    /// Copy with the entry at `index` removed, `None` if out of range
    pub fn without_entry(&self, index: usize) -> Option<Self> {
        if index >= self.entries.len() {
            return None;
        }
        let mut next = self.clone();
        next.entries.remove(index);
        Some(next)
    }

    /// Copy with a new display name (same storage key)
    #[must_use]
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}

/// One playlist entry after resolution against the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEntry {
    /// Identifier as stored in the playlist
    pub id: TrackId,

    /// The track, or `None` if the identifier no longer resolves
    pub track: Option<Arc<TrackDescriptor>>,
}

/// A playlist mapped onto the currently loaded catalog
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlaylist {
    /// Playlist display name
    pub name: String,

    /// Storage key of the source playlist
    pub storage_key: String,

    /// Entries in play order
    pub entries: Vec<ResolvedEntry>,
}

impl ResolvedPlaylist {
    /// Number of entries, resolved or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the playlist has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Track at `index` if the index is valid and the entry resolved
    pub fn track_at(&self, index: usize) -> Option<&Arc<TrackDescriptor>> {
        self.entries.get(index).and_then(|entry| entry.track.as_ref())
    }

    /// Identifiers that did not resolve, in playlist order
    pub fn missing_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.track.is_none())
            .map(|entry| entry.id.as_str())
            .collect()
    }

    /// Index of the first resolved entry
    pub fn first_playable(&self) -> Option<usize> {
        self.entries.iter().position(|entry| entry.track.is_some())
    }

    /// Index of the next resolved entry after `index`
    pub fn next_playable(&self, index: usize) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, entry)| entry.track.is_some())
            .map(|(i, _)| i)
    }

    /// Index of the closest resolved entry before `index`
    pub fn previous_playable(&self, index: usize) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .take(index.min(self.entries.len()))
            .rev()
            .find(|(_, entry)| entry.track.is_some())
            .map(|(i, _)| i)
    }
}

/// The set of tracks loaded from the current folder
#[derive(Debug, Clone, Default)]
pub struct TrackCatalog {
    tracks: Vec<Arc<TrackDescriptor>>,
}

impl TrackCatalog {
    /// Build a catalog from loaded descriptors (order is preserved)
    pub fn new(tracks: Vec<TrackDescriptor>) -> Self {
        Self {
            tracks: tracks.into_iter().map(Arc::new).collect(),
        }
    }

    /// Look a track up by identifier
    pub fn get(&self, id: &str) -> Option<&Arc<TrackDescriptor>> {
        self.tracks.iter().find(|track| track.id == id)
    }

    /// All tracks in catalog order
    pub fn tracks(&self) -> &[Arc<TrackDescriptor>] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Map a playlist's identifiers onto this catalog
    pub fn resolve(&self, playlist: &PlaylistDescriptor) -> ResolvedPlaylist {
        let entries = playlist
            .entries
            .iter()
            .map(|id| ResolvedEntry {
                id: id.clone(),
                track: self.get(id).cloned(),
            })
            .collect();

        ResolvedPlaylist {
            name: playlist.name.clone(),
            storage_key: playlist.storage_key.clone(),
            entries,
        }
    }
}

/// Thresholds that silence the calls stream automatically
///
/// Both conditions are evaluated independently; either one fires the mute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoMuteConfig {
    /// Mute once this many repetitions have started
    #[serde(default)]
    pub after_reps: Option<usize>,

    /// Mute once this many repetitions (or fewer) remain
    #[serde(default)]
    pub with_reps_remaining: Option<usize>,
}

impl AutoMuteConfig {
    /// Whether any threshold is configured
    pub fn is_enabled(&self) -> bool {
        self.after_reps.is_some() || self.with_reps_remaining.is_some()
    }
}

/// Observable playback state, published after every mutating operation
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Loaded track, if any
    pub current_track: Option<Arc<TrackDescriptor>>,

    /// Whether a calls stream is open for the loaded track
    pub calls_available: bool,

    pub is_playing: bool,

    /// A scrub drag is in progress
    pub is_seeking: bool,

    /// Displayed position (0 when nothing is loaded)
    pub position_ms: u64,

    /// Music stream duration (0 when nothing is loaded)
    pub duration_ms: u64,

    /// Music/calls balance in [0.0, 1.0]
    pub balance: f32,

    pub calls_muted: bool,

    /// Number of repetitions started at `position_ms`
    pub current_repetition: usize,
}

impl PlaybackState {
    /// Empty state with the given balance
    pub fn empty(balance: f32) -> Self {
        Self {
            current_track: None,
            calls_available: false,
            is_playing: false,
            is_seeking: false,
            position_ms: 0,
            duration_ms: 0,
            balance,
            calls_muted: false,
            current_repetition: 0,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.current_track.is_some()
    }

    /// Position as a fraction of duration (0 if duration is 0)
    pub fn progress(&self) -> f32 {
        if self.duration_ms == 0 {
            0.0
        } else {
            (self.position_ms as f64 / self.duration_ms as f64) as f32
        }
    }

    /// "Rep X / N" label, only for tracks that have repetitions
    pub fn repetition_label(&self) -> Option<String> {
        let total = self.current_track.as_ref()?.repetition_count();
        (total > 0).then(|| format!("Rep {} / {}", self.current_repetition, total))
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::empty(0.5)
    }
}

/// Playlist navigation state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationState {
    /// Active playlist after resolution
    pub active_playlist: Option<ResolvedPlaylist>,

    /// Current entry index; `None` means no current position
    pub position: Option<usize>,
}

impl NavigationState {
    /// Whether a later playable entry exists
    pub fn has_next(&self) -> bool {
        self.next_index().is_some()
    }

    /// Whether an earlier playable entry exists
    pub fn has_previous(&self) -> bool {
        self.previous_index().is_some()
    }

    pub(crate) fn next_index(&self) -> Option<usize> {
        let playlist = self.active_playlist.as_ref()?;
        playlist.next_playable(self.position?)
    }

    pub(crate) fn previous_index(&self) -> Option<usize> {
        let playlist = self.active_playlist.as_ref()?;
        playlist.previous_playable(self.position?)
    }
}

/// Format milliseconds as `m:ss`
pub fn format_clock(ms: u64) -> String {
    let total_seconds = ms / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}
