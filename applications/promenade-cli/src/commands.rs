//! Subcommand implementations
//!
//! Each command writes its report to `out` so it can be checked in tests.

use anyhow::{bail, Context, Result};
use promenade_catalog::{
    create_playlist, PreferenceStore, TrackFolder, PREF_LAST_FOLDER, PREF_LAST_PLAYLIST,
};
use promenade_core::{
    format_clock, AutoMuteConfig, AutoMuteController, PlaybackEvent, PlayerConfig,
    PlaylistDescriptor,
};
use std::io::Write;
use std::path::PathBuf;

/// Folder from the command line, or the one used last time
pub fn resolve_folder(arg: Option<PathBuf>, prefs: &dyn PreferenceStore) -> Result<PathBuf> {
    if let Some(folder) = arg {
        return Ok(folder);
    }
    prefs
        .get(PREF_LAST_FOLDER)?
        .map(PathBuf::from)
        .context("No folder set. Pass --folder or set PROMENADE_FOLDER")
}

fn find_playlist(folder: &TrackFolder, key_or_name: &str) -> Result<PlaylistDescriptor> {
    folder
        .find_playlist(key_or_name)
        .cloned()
        .with_context(|| format!("No playlist named '{}'", key_or_name))
}

pub fn list_tracks(folder: &TrackFolder, out: &mut impl Write) -> Result<()> {
    for track in folder.tracks().tracks() {
        let calls = if track.calls_source.is_some() { "calls" } else { "music only" };
        write!(
            out,
            "{}  [{}]  {}, {} reps",
            track.name,
            track.id,
            calls,
            track.repetition_count()
        )?;
        if !track.intro.is_empty() {
            write!(out, ", intro: {}", track.intro)?;
        }
        writeln!(out)?;
    }

    for warning in folder.warnings() {
        writeln!(out, "warning: {}", warning)?;
    }
    Ok(())
}

pub fn list_playlists(folder: &TrackFolder, out: &mut impl Write) -> Result<()> {
    for playlist in folder.playlists() {
        writeln!(
            out,
            "{}  [{}]  {} entries",
            playlist.name,
            playlist.storage_key,
            playlist.entries.len()
        )?;
    }
    Ok(())
}

/// Print a playlist with its entries resolved against the folder
///
/// Without a name, the last playlist shown is used. The shown playlist is
/// remembered.
pub fn show_playlist(
    folder: &TrackFolder,
    prefs: &mut dyn PreferenceStore,
    key_or_name: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    let key = match key_or_name {
        Some(key) => key.to_string(),
        None => prefs
            .get(PREF_LAST_PLAYLIST)?
            .context("No playlist given and none shown before")?,
    };
    let playlist = find_playlist(folder, &key)?;
    let resolved = folder.tracks().resolve(&playlist);

    writeln!(out, "{} [{}]", resolved.name, resolved.storage_key)?;
    for (index, entry) in resolved.entries.iter().enumerate() {
        match entry.track.as_ref() {
            Some(track) => writeln!(out, "{:>3}. {}", index + 1, track.name)?,
            None => writeln!(out, "{:>3}. (missing) {}", index + 1, entry.id)?,
        }
    }
    if let Some(message) =
        PlaybackEvent::playlist_resolution(&resolved.name, &resolved.missing_ids())
            .as_ref()
            .and_then(PlaybackEvent::message)
    {
        writeln!(out, "warning: {}", message)?;
    }

    prefs.set(PREF_LAST_PLAYLIST, &playlist.storage_key)?;
    Ok(())
}

pub fn create(folder: &mut TrackFolder, name: &str, out: &mut impl Write) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Playlist name must not be empty");
    }
    let playlist = create_playlist(name.trim());
    let key = playlist.storage_key.clone();
    folder.save_playlist(playlist)?;
    writeln!(out, "Created '{}' ({})", name.trim(), key)?;
    Ok(())
}

pub fn add(
    folder: &mut TrackFolder,
    key_or_name: &str,
    track_ids: &[String],
    out: &mut impl Write,
) -> Result<()> {
    let mut playlist = find_playlist(folder, key_or_name)?;
    for id in track_ids {
        if folder.tracks().get(id).is_none() {
            bail!("No track '{}' in {}", id, folder.path().display());
        }
        playlist = playlist.with_entry(id.as_str());
    }

    let count = playlist.entries.len();
    let name = playlist.name.clone();
    folder.save_playlist(playlist)?;
    writeln!(out, "'{}' now has {} entries", name, count)?;
    Ok(())
}

/// Remove the entry at a 1-based `position`
pub fn remove(
    folder: &mut TrackFolder,
    key_or_name: &str,
    position: usize,
    out: &mut impl Write,
) -> Result<()> {
    let playlist = find_playlist(folder, key_or_name)?;
    let updated = position
        .checked_sub(1)
        .and_then(|index| playlist.without_entry(index))
        .with_context(|| {
            format!(
                "Position {} is out of range (1-{})",
                position,
                playlist.entries.len()
            )
        })?;

    let removed = &playlist.entries[position - 1];
    writeln!(out, "Removed {} from '{}'", removed, playlist.name)?;
    folder.save_playlist(updated)?;
    Ok(())
}

pub fn rename(
    folder: &mut TrackFolder,
    key_or_name: &str,
    name: &str,
    out: &mut impl Write,
) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Playlist name must not be empty");
    }
    let playlist = find_playlist(folder, key_or_name)?;
    folder.save_playlist(playlist.renamed(name.trim()))?;
    writeln!(out, "Renamed '{}' to '{}'", playlist.name, name.trim())?;
    Ok(())
}

pub fn delete(
    folder: &mut TrackFolder,
    prefs: &mut dyn PreferenceStore,
    key_or_name: &str,
    out: &mut impl Write,
) -> Result<()> {
    let playlist = find_playlist(folder, key_or_name)?;
    folder.delete_playlist(&playlist.storage_key)?;

    if prefs.get(PREF_LAST_PLAYLIST)?.as_deref() == Some(playlist.storage_key.as_str()) {
        prefs.remove(PREF_LAST_PLAYLIST)?;
    }
    writeln!(out, "Deleted '{}'", playlist.name)?;
    Ok(())
}

/// Walk a track's repetitions and report when the calls would be muted
///
/// Thresholds given on the command line replace the configured ones.
pub fn schedule(
    folder: &TrackFolder,
    config: &PlayerConfig,
    track_id: &str,
    after: Option<usize>,
    remaining: Option<usize>,
    out: &mut impl Write,
) -> Result<()> {
    let track = folder
        .tracks()
        .get(track_id)
        .with_context(|| format!("No track '{}'", track_id))?;

    let thresholds = if after.is_some() || remaining.is_some() {
        AutoMuteConfig {
            after_reps: after,
            with_reps_remaining: remaining,
        }
    } else {
        config.auto_mute
    };
    let mut controller = AutoMuteController::new(thresholds);
    let total = track.repetition_count();

    writeln!(out, "{} ({} reps)", track.name, total)?;
    if total == 0 {
        let calls = if controller.should_mute(0, 0) { "muted" } else { "on" };
        writeln!(out, "No repetition markers; calls {} for the whole track", calls)?;
        return Ok(());
    }

    // Repetition k starts at boundary k-1; repetition 0 is the intro
    let starts = std::iter::once(0.0).chain(track.repetitions.iter().copied());
    for (rep, start) in starts.enumerate() {
        controller.evaluate(rep, total);
        let calls = if controller.is_muted() { "muted" } else { "on" };
        let label = if rep == 0 {
            "Intro".to_string()
        } else {
            format!("Rep {} / {}", rep, total)
        };
        writeln!(
            out,
            "{:<12} {:>6}  calls {}",
            label,
            format_clock((start * 1000.0) as u64),
            calls
        )?;
    }
    Ok(())
}

pub fn print_config(config: &PlayerConfig, out: &mut impl Write) -> Result<()> {
    writeln!(out, "tick_interval_ms = {}", config.tick_interval_ms)?;
    writeln!(out, "initial_balance = {}", config.initial_balance)?;
    writeln!(
        out,
        "auto_mute.after_reps = {}",
        config
            .auto_mute
            .after_reps
            .map_or_else(|| "off".to_string(), |n| n.to_string())
    )?;
    writeln!(
        out,
        "auto_mute.with_reps_remaining = {}",
        config
            .auto_mute
            .with_reps_remaining
            .map_or_else(|| "off".to_string(), |n| n.to_string())
    )?;
    Ok(())
}
