//! Track descriptor files
//!
//! Every `*.json` file in the folder that is not a playlist describes one
//! track. Media paths are relative to the folder and the descriptor's own
//! file name is the identifier playlists refer to.
//!
//! ```json
//! {
//!   "name": "Plus Singing Call",
//!   "music_file": "plus.mp3",
//!   "calls_file": "plus-calls.mp3",
//!   "intro": "8 beats",
//!   "repetitions": [{ "start": 12.5 }, { "start": 44.0 }]
//! }
//! ```

use crate::scanner::{file_name_of, is_playlist_file, json_files};
use crate::{CatalogError, CatalogWarning, Result};
use promenade_core::{MediaSource, TrackDescriptor};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// On-disk track descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackFile {
    pub name: String,
    pub music_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calls_file: Option<String>,
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub repetitions: Vec<RepetitionMark>,
}

/// Start of one repetition, in seconds from the beginning of the music
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepetitionMark {
    pub start: f64,
}

/// Tracks loaded from a folder plus what was skipped or degraded
#[derive(Debug, Clone, Default)]
pub struct TrackLoad {
    /// Sorted by name, case-insensitively
    pub tracks: Vec<TrackDescriptor>,
    pub warnings: Vec<CatalogWarning>,
}

/// Load every track descriptor in `folder`
///
/// Unreadable or invalid files are skipped with a warning; a missing calls
/// file keeps the track as music-only, also with a warning.
pub fn load_tracks(folder: &Path) -> Result<TrackLoad> {
    let mut load = TrackLoad::default();

    for path in json_files(folder)? {
        let file_name = file_name_of(&path);
        if is_playlist_file(&file_name) {
            continue;
        }

        match parse_track_file(&path) {
            Ok((track, warning)) => {
                if let Some(warning) = warning {
                    warn!("Track {}", warning);
                    load.warnings.push(warning);
                }
                load.tracks.push(track);
            }
            Err(e) => {
                warn!("Skipping {}: {}", file_name, e);
                load.warnings
                    .push(CatalogWarning::new(file_name, format!("skipped: {}", e)));
            }
        }
    }

    load.tracks.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
    debug!(
        "Loaded {} tracks from {} ({} warnings)",
        load.tracks.len(),
        folder.display(),
        load.warnings.len()
    );
    Ok(load)
}

/// Parse one descriptor file, resolving media paths next to it
///
/// Returns the track and, if the calls file is missing, a warning.
pub fn parse_track_file(path: &Path) -> Result<(TrackDescriptor, Option<CatalogWarning>)> {
    let file_name = file_name_of(path);
    let folder = path.parent().unwrap_or_else(|| Path::new("."));
    let text = fs::read_to_string(path)?;
    let file: TrackFile = serde_json::from_str(&text)?;

    let music_path = folder.join(&file.music_file);
    if !music_path.is_file() {
        return Err(CatalogError::invalid_track(
            &file_name,
            format!("music file '{}' not found", file.music_file),
        ));
    }

    let starts: Vec<f64> = file.repetitions.iter().map(|mark| mark.start).collect();
    if starts.iter().any(|start| !start.is_finite() || *start < 0.0) {
        return Err(CatalogError::invalid_track(
            &file_name,
            "repetition starts must be non-negative",
        ));
    }
    if starts.windows(2).any(|pair| pair[1] < pair[0]) {
        return Err(CatalogError::invalid_track(
            &file_name,
            "repetition starts must not decrease",
        ));
    }

    let mut track = TrackDescriptor::new(&file_name, file.name, MediaSource::new(music_path))
        .with_intro(file.intro)
        .with_repetitions(starts);

    let mut warning = None;
    if let Some(calls_file) = file.calls_file.filter(|calls| !calls.is_empty()) {
        let calls_path = folder.join(&calls_file);
        if calls_path.is_file() {
            track = track.with_calls(MediaSource::new(calls_path));
        } else {
            warning = Some(CatalogWarning::new(
                &file_name,
                format!("calls file '{}' not found, music only", calls_file),
            ));
        }
    }

    Ok((track, warning))
}
