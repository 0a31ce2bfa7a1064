/// Promenade - square dance practice track and playlist tool
use anyhow::Context;
use clap::{Parser, Subcommand};
use promenade_catalog::{JsonFilePreferences, PreferenceStore, TrackFolder, PREF_LAST_FOLDER};
use promenade_core::PlayerConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "promenade")]
#[command(about = "Square dance practice tracks and playlists", long_about = None)]
struct Cli {
    /// Track folder (defaults to the last folder used)
    #[arg(short, long, env = "PROMENADE_FOLDER", global = true)]
    folder: Option<PathBuf>,

    /// Preference file
    #[arg(long, env = "PROMENADE_PREFS", global = true)]
    prefs: Option<PathBuf>,

    /// Player configuration file (TOML, JSON or YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// List the tracks in the folder
    Tracks,
    /// List the playlists in the folder
    Playlists,
    /// Show a playlist's entries (defaults to the last one shown)
    Show {
        /// Playlist name or file name
        playlist: Option<String>,
    },
    /// Create an empty playlist
    Create {
        /// Display name
        name: String,
    },
    /// Append tracks to a playlist
    Add {
        /// Playlist name or file name
        playlist: String,
        /// Track file names
        #[arg(required = true)]
        tracks: Vec<String>,
    },
    /// Remove the entry at a position (1-based)
    Remove {
        /// Playlist name or file name
        playlist: String,
        position: usize,
    },
    /// Rename a playlist
    Rename {
        /// Playlist name or file name
        playlist: String,
        /// New display name
        name: String,
    },
    /// Delete a playlist file
    Delete {
        /// Playlist name or file name
        playlist: String,
    },
    /// Show per-repetition calls muting for a track
    Schedule {
        /// Track file name
        track: String,
        /// Mute once this many repetitions have started
        #[arg(long)]
        after: Option<usize>,
        /// Mute when this many repetitions remain
        #[arg(long)]
        remaining: Option<usize>,
    },
    /// Print the effective player configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "promenade=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = PlayerConfig::load(cli.config.as_deref()).context("Failed to load player config")?;

    if cli.command == Commands::Config {
        return commands::print_config(&config, &mut std::io::stdout());
    }

    let prefs_path = match cli.prefs {
        Some(path) => path,
        None => default_prefs_path()?,
    };
    let mut prefs = JsonFilePreferences::open(&prefs_path)
        .with_context(|| format!("Failed to open preferences {}", prefs_path.display()))?;

    let folder_path = commands::resolve_folder(cli.folder, &prefs)?;
    let mut folder = TrackFolder::open(&folder_path)
        .with_context(|| format!("Failed to load folder {}", folder_path.display()))?;
    prefs.set(PREF_LAST_FOLDER, &folder_path.to_string_lossy())?;
    tracing::debug!("Using folder {}", folder_path.display());

    let mut out = std::io::stdout();
    match cli.command {
        Commands::Tracks => commands::list_tracks(&folder, &mut out),
        Commands::Playlists => commands::list_playlists(&folder, &mut out),
        Commands::Show { playlist } => {
            commands::show_playlist(&folder, &mut prefs, playlist.as_deref(), &mut out)
        }
        Commands::Create { name } => commands::create(&mut folder, &name, &mut out),
        Commands::Add { playlist, tracks } => {
            commands::add(&mut folder, &playlist, &tracks, &mut out)
        }
        Commands::Remove { playlist, position } => {
            commands::remove(&mut folder, &playlist, position, &mut out)
        }
        Commands::Rename { playlist, name } => {
            commands::rename(&mut folder, &playlist, &name, &mut out)
        }
        Commands::Delete { playlist } => {
            commands::delete(&mut folder, &mut prefs, &playlist, &mut out)
        }
        Commands::Schedule {
            track,
            after,
            remaining,
        } => commands::schedule(&folder, &config, &track, after, remaining, &mut out),
        Commands::Config => Ok(()),
    }
}

/// `<config dir>/promenade/prefs.json`
fn default_prefs_path() -> anyhow::Result<PathBuf> {
    let base = dirs::config_dir().context("No config directory; pass --prefs")?;
    Ok(base.join("promenade").join("prefs.json"))
}
