//! Promenade - Catalog
//!
//! Loads track and playlist descriptors from a folder of JSON files, saves
//! and deletes playlists, and stores user preferences.
//!
//! # Example
//!
//! ```rust,no_run
//! use promenade_catalog::{create_playlist, TrackFolder};
//!
//! # fn example() -> promenade_catalog::Result<()> {
//! let mut folder = TrackFolder::open("/sdcard/Music/SquareDance")?;
//! for warning in folder.warnings() {
//!     eprintln!("{warning}");
//! }
//!
//! let playlist = create_playlist("Monday Class").with_entry("plus.json");
//! folder.save_playlist(playlist)?;
//! # Ok(())
//! # }
//! ```

mod error;
mod folder;
mod playlists;
mod prefs;
mod scanner;
mod tracks;

pub use error::{CatalogError, CatalogWarning, Result};
pub use folder::TrackFolder;
pub use playlists::{
    create_playlist, delete_playlist, generate_playlist_file_name, load_playlists,
    playlist_file_name_at, save_playlist, PlaylistFile, PlaylistLoad,
};
pub use prefs::{
    JsonFilePreferences, MemoryPreferences, PreferenceStore, PREF_LAST_FOLDER, PREF_LAST_PLAYLIST,
};
pub use scanner::{is_playlist_file, PLAYLIST_PREFIX};
pub use tracks::{load_tracks, parse_track_file, RepetitionMark, TrackFile, TrackLoad};
