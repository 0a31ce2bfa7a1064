//! Playlist files
//!
//! Playlists live next to the tracks as `playlist_*.json`:
//!
//! ```json
//! { "name": "Monday Class", "entries": ["plus.json", "mainstream.json"] }
//! ```
//!
//! The file name is the playlist's storage key. Entries are track file
//! names and may repeat.

use crate::scanner::{file_name_of, is_playlist_file, json_files, PLAYLIST_PREFIX};
use crate::{CatalogError, CatalogWarning, Result};
use promenade_core::PlaylistDescriptor;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// On-disk playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistFile {
    pub name: String,
    #[serde(default)]
    pub entries: Vec<String>,
}

/// Playlists loaded from a folder plus the files that were skipped
#[derive(Debug, Clone, Default)]
pub struct PlaylistLoad {
    /// Sorted by name, case-insensitively
    pub playlists: Vec<PlaylistDescriptor>,
    pub warnings: Vec<CatalogWarning>,
}

/// Load every `playlist_*.json` in `folder`
pub fn load_playlists(folder: &Path) -> Result<PlaylistLoad> {
    let mut load = PlaylistLoad::default();

    for path in json_files(folder)? {
        let file_name = file_name_of(&path);
        if !is_playlist_file(&file_name) {
            continue;
        }

        match read_playlist(&path) {
            Ok(file) => load.playlists.push(PlaylistDescriptor {
                name: file.name,
                storage_key: file_name,
                entries: file.entries,
            }),
            Err(e) => {
                warn!("Skipping {}: {}", file_name, e);
                load.warnings
                    .push(CatalogWarning::new(file_name, format!("skipped: {}", e)));
            }
        }
    }

    load.playlists.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.storage_key.cmp(&b.storage_key))
    });
    debug!(
        "Loaded {} playlists from {}",
        load.playlists.len(),
        folder.display()
    );
    Ok(load)
}

fn read_playlist(path: &Path) -> Result<PlaylistFile> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Write `playlist` to `folder` (pretty-printed), returns the file path
pub fn save_playlist(folder: &Path, playlist: &PlaylistDescriptor) -> Result<PathBuf> {
    let path = playlist_path(folder, &playlist.storage_key)?;
    let file = PlaylistFile {
        name: playlist.name.clone(),
        entries: playlist.entries.clone(),
    };

    fs::write(&path, serde_json::to_string_pretty(&file)?)?;
    info!(
        "Saved playlist '{}' ({} entries) to {}",
        playlist.name,
        playlist.entries.len(),
        playlist.storage_key
    );
    Ok(path)
}

/// Remove the playlist's file from `folder`
pub fn delete_playlist(folder: &Path, playlist: &PlaylistDescriptor) -> Result<()> {
    let path = playlist_path(folder, &playlist.storage_key)?;
    if !path.is_file() {
        return Err(CatalogError::PlaylistNotFound(playlist.storage_key.clone()));
    }

    fs::remove_file(&path)?;
    info!("Deleted playlist '{}' ({})", playlist.name, playlist.storage_key);
    Ok(())
}

/// Storage keys must be plain playlist file names inside the folder
fn playlist_path(folder: &Path, storage_key: &str) -> Result<PathBuf> {
    let plain = Path::new(storage_key).file_name().and_then(|name| name.to_str());
    if plain != Some(storage_key) || !is_playlist_file(storage_key) {
        return Err(CatalogError::InvalidPlaylistName(storage_key.to_string()));
    }
    Ok(folder.join(storage_key))
}

/// New, empty playlist with a freshly generated storage key
pub fn create_playlist(name: &str) -> PlaylistDescriptor {
    PlaylistDescriptor::new(name, generate_playlist_file_name(name))
}

/// `playlist_<sanitised name>_<unix millis>.json`
pub fn generate_playlist_file_name(name: &str) -> String {
    playlist_file_name_at(name, chrono::Utc::now().timestamp_millis())
}

/// File name for `name` at a given timestamp
///
/// Sanitising keeps ASCII letters, digits, `_`, `-` and spaces, then turns
/// spaces into underscores and lowercases.
pub fn playlist_file_name_at(name: &str, unix_millis: i64) -> String {
    let sanitized: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ' '))
        .map(|c| if c == ' ' { '_' } else { c.to_ascii_lowercase() })
        .collect();
    format!("{}{}_{}.json", PLAYLIST_PREFIX, sanitized, unix_millis)
}
