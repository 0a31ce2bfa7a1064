//! Folder scanning for descriptor files

use crate::{CatalogError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Descriptor file extension
const JSON_EXTENSION: &str = "json";

/// File name prefix that marks a playlist
pub const PLAYLIST_PREFIX: &str = "playlist_";

/// Whether `file_name` names a playlist file (`playlist_*.json`)
pub fn is_playlist_file(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    lower.starts_with(PLAYLIST_PREFIX) && has_json_extension(&lower)
}

fn has_json_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(JSON_EXTENSION))
}

/// File name of `path` as an owned string (lossy)
pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// All `*.json` files directly inside `folder`, sorted by file name
pub(crate) fn json_files(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(CatalogError::NotADirectory(folder.display().to_string()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| has_json_extension(&file_name_of(path)))
        .collect();

    files.sort();
    Ok(files)
}
