//! Playback Events
//!
//! Event-based communication for the display layer. Events are queued by the
//! engine and navigator and drained after each operation:
//! - Track completion (drives playlist auto-advance)
//! - Load warnings and failures
//! - Playlist resolution warnings (one per selection)
//! - Auto-mute firing

use serde::{Deserialize, Serialize};

/// Events emitted by the playback core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Music stream reached its natural end
    TrackCompleted {
        /// ID of the finished track
        track_id: String,
    },

    /// Calls stream could not be opened; the track plays music-only
    PartialLoadWarning {
        /// Message for display
        message: String,
    },

    /// Music stream could not be opened; nothing is loaded
    LoadFailure {
        /// Message for display
        message: String,
    },

    /// Some playlist entries do not match any loaded track
    PlaylistResolutionWarning {
        /// Message for display, naming the playlist and the missing entries
        message: String,
    },

    /// Auto-mute silenced the calls stream
    CallsAutoMuted {
        /// Repetition at which the mute fired
        repetition: usize,
    },
}

impl PlaybackEvent {
    /// Whether the event should be shown to the user as a warning or error
    pub fn is_notice(&self) -> bool {
        matches!(
            self,
            Self::PartialLoadWarning { .. }
                | Self::LoadFailure { .. }
                | Self::PlaylistResolutionWarning { .. }
        )
    }

    /// Display text for notices
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::PartialLoadWarning { message }
            | Self::LoadFailure { message }
            | Self::PlaylistResolutionWarning { message } => Some(message),
            Self::TrackCompleted { .. } | Self::CallsAutoMuted { .. } => None,
        }
    }

    /// Aggregated warning for unresolved playlist entries, `None` if all resolved
    pub fn playlist_resolution(playlist_name: &str, missing: &[&str]) -> Option<Self> {
        if missing.is_empty() {
            return None;
        }

        let noun = if missing.len() == 1 { "entry" } else { "entries" };
        Some(Self::PlaylistResolutionWarning {
            message: format!(
                "Playlist '{}': {} {} not found: {}",
                playlist_name,
                missing.len(),
                noun,
                missing.join(", ")
            ),
        })
    }
}
