//! Error types for the catalog

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Invalid track file {file}: {reason}")]
    InvalidTrack { file: String, reason: String },

    #[error("Invalid playlist file name: {0}")]
    InvalidPlaylistName(String),

    #[error("Playlist not found: {0}")]
    PlaylistNotFound(String),
}

impl CatalogError {
    pub(crate) fn invalid_track(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTrack {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// A file skipped or degraded while loading a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogWarning {
    /// File name inside the folder
    pub file: String,

    /// What went wrong
    pub reason: String,
}

impl CatalogWarning {
    pub fn new(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CatalogWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.reason)
    }
}
