//! Error types for playback management

use thiserror::Error;

/// Errors reported by an [`AudioStream`](crate::AudioStream) implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The stream could not be prepared for the given source
    #[error("Cannot open {source_name}: {reason}")]
    Open {
        /// Display form of the media source
        source_name: String,
        /// Backend-specific reason
        reason: String,
    },

    /// Any other backend failure (stop/release on a broken stream, etc.)
    #[error("Stream error: {0}")]
    Backend(String),
}

impl StreamError {
    /// Create an open error
    pub fn open(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Open {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The music stream of a track failed to open; the engine stays empty
    #[error("Failed to load track '{track}': {cause}")]
    LoadFailure {
        /// Name of the track that failed
        track: String,
        /// Underlying stream error
        #[source]
        cause: StreamError,
    },

    /// Session owner thread is gone
    #[error("Playback session is no longer running")]
    SessionClosed,

    /// Configuration could not be read
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for PlaybackError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
