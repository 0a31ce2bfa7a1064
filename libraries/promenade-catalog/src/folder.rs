//! A loaded track folder
//!
//! Snapshot of one folder's tracks and playlists. Reloading replaces the
//! whole snapshot; tracks already handed to the engine stay alive through
//! their `Arc`.

use crate::playlists::{self, load_playlists};
use crate::tracks::load_tracks;
use crate::{CatalogError, CatalogWarning, Result};
use promenade_core::{PlaylistDescriptor, TrackCatalog};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct TrackFolder {
    path: PathBuf,
    tracks: TrackCatalog,
    playlists: Vec<PlaylistDescriptor>,
    warnings: Vec<CatalogWarning>,
}

impl TrackFolder {
    /// Load tracks and playlists from `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut folder = Self {
            path: path.into(),
            tracks: TrackCatalog::default(),
            playlists: Vec::new(),
            warnings: Vec::new(),
        };
        folder.reload()?;
        Ok(folder)
    }

    /// Re-read everything from disk
    pub fn reload(&mut self) -> Result<()> {
        let tracks = load_tracks(&self.path)?;
        let playlists = load_playlists(&self.path)?;

        self.warnings = tracks.warnings;
        self.warnings.extend(playlists.warnings);
        self.tracks = TrackCatalog::new(tracks.tracks);
        self.playlists = playlists.playlists;

        info!(
            "Loaded {} tracks and {} playlists from {} ({} warnings)",
            self.tracks.len(),
            self.playlists.len(),
            self.path.display(),
            self.warnings.len()
        );
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tracks(&self) -> &TrackCatalog {
        &self.tracks
    }

    pub fn playlists(&self) -> &[PlaylistDescriptor] {
        &self.playlists
    }

    /// Files skipped or degraded by the last load
    pub fn warnings(&self) -> &[CatalogWarning] {
        &self.warnings
    }

    pub fn playlist(&self, storage_key: &str) -> Option<&PlaylistDescriptor> {
        self.playlists
            .iter()
            .find(|playlist| playlist.storage_key == storage_key)
    }

    /// Look up by storage key, then by name (case-insensitive)
    pub fn find_playlist(&self, key_or_name: &str) -> Option<&PlaylistDescriptor> {
        self.playlist(key_or_name).or_else(|| {
            let wanted = key_or_name.to_lowercase();
            self.playlists
                .iter()
                .find(|playlist| playlist.name.to_lowercase() == wanted)
        })
    }

    /// Persist `playlist` and update the in-memory list
    pub fn save_playlist(&mut self, playlist: PlaylistDescriptor) -> Result<()> {
        playlists::save_playlist(&self.path, &playlist)?;

        match self
            .playlists
            .iter_mut()
            .find(|existing| existing.storage_key == playlist.storage_key)
        {
            Some(existing) => *existing = playlist,
            None => self.playlists.push(playlist),
        }
        self.playlists
            .sort_by_key(|playlist| (playlist.name.to_lowercase(), playlist.storage_key.clone()));
        Ok(())
    }

    /// Delete a playlist file, returns the removed playlist
    pub fn delete_playlist(&mut self, storage_key: &str) -> Result<PlaylistDescriptor> {
        let index = self
            .playlists
            .iter()
            .position(|playlist| playlist.storage_key == storage_key)
            .ok_or_else(|| CatalogError::PlaylistNotFound(storage_key.to_string()))?;

        playlists::delete_playlist(&self.path, &self.playlists[index])?;
        Ok(self.playlists.remove(index))
    }
}
