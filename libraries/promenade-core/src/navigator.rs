//! Playlist navigation
//!
//! Tracks the active playlist and the current entry, and drives the engine
//! through selection, direct selection, previous/next and auto-advance.
//! Navigation never wraps around and always skips entries that did not
//! resolve against the catalog.

use crate::{
    engine::PlaybackEngine,
    error::Result,
    events::PlaybackEvent,
    types::{NavigationState, PlaylistDescriptor, ResolvedPlaylist, TrackCatalog},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Active playlist plus current entry
#[derive(Debug, Default)]
pub struct PlaylistNavigator {
    state: NavigationState,
    pending_events: Vec<PlaybackEvent>,
}

impl PlaylistNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `playlist` the active playlist, or clear it with `None`
    ///
    /// Unresolved entries produce a single aggregated warning. The first
    /// playable entry becomes current and is loaded without starting
    /// playback; with no playable entry the engine is stopped. Clearing
    /// leaves the engine untouched.
    pub fn select(
        &mut self,
        playlist: Option<&PlaylistDescriptor>,
        catalog: &TrackCatalog,
        engine: &mut PlaybackEngine,
    ) -> Result<()> {
        let Some(playlist) = playlist else {
            debug!("Active playlist cleared");
            self.state = NavigationState::default();
            return Ok(());
        };

        let resolved = catalog.resolve(playlist);
        if let Some(warning) = PlaybackEvent::playlist_resolution(&resolved.name, &resolved.missing_ids()) {
            if let Some(message) = warning.message() {
                warn!("{}", message);
            }
            self.pending_events.push(warning);
        }

        let first = resolved.first_playable();
        info!(
            "Selected playlist '{}' ({} entries, first playable: {:?})",
            resolved.name,
            resolved.len(),
            first
        );

        let track = first.and_then(|index| resolved.track_at(index).map(Arc::clone));
        self.state = NavigationState {
            active_playlist: Some(resolved),
            position: first,
        };

        match track {
            Some(track) => engine.load(track).map(|_| ()),
            None => {
                engine.stop();
                Ok(())
            }
        }
    }

    /// Jump to `index`, load it and start playing
    ///
    /// Returns `Ok(false)` without touching anything if the index is out of
    /// range or the entry is unresolved.
    pub fn play_at(&mut self, index: usize, engine: &mut PlaybackEngine) -> Result<bool> {
        let Some(track) = self
            .state
            .active_playlist
            .as_ref()
            .and_then(|playlist| playlist.track_at(index))
            .map(Arc::clone)
        else {
            debug!("Ignoring selection of unplayable entry {}", index);
            return Ok(false);
        };

        self.state.position = Some(index);
        engine.load(track)?;
        engine.play();
        Ok(true)
    }

    /// Advance to the next playable entry (no wraparound)
    pub fn next(&mut self, engine: &mut PlaybackEngine) -> Result<bool> {
        match self.state.next_index() {
            Some(index) => self.play_at(index, engine),
            None => Ok(false),
        }
    }

    /// Go back to the previous playable entry (no wraparound)
    pub fn previous(&mut self, engine: &mut PlaybackEngine) -> Result<bool> {
        match self.state.previous_index() {
            Some(index) => self.play_at(index, engine),
            None => Ok(false),
        }
    }

    /// Auto-advance after the music stream finished
    ///
    /// At the last playable entry playback simply stays stopped.
    pub fn on_track_completed(&mut self, engine: &mut PlaybackEngine) -> Result<bool> {
        if self.state.next_index().is_none() {
            debug!("End of playlist reached");
            return Ok(false);
        }
        self.next(engine)
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn active_playlist(&self) -> Option<&ResolvedPlaylist> {
        self.state.active_playlist.as_ref()
    }

    pub fn position(&self) -> Option<usize> {
        self.state.position
    }

    pub fn has_next(&self) -> bool {
        self.state.has_next()
    }

    pub fn has_previous(&self) -> bool {
        self.state.has_previous()
    }

    /// Forget the active playlist
    pub fn clear(&mut self) {
        self.state = NavigationState::default();
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }
}
