//! Player configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! file (TOML/JSON/YAML by extension), then `PROMENADE_*` environment
//! variables (`PROMENADE_AUTO_MUTE__AFTER_REPS=3`).

use crate::error::Result;
use crate::mixer::clamp_balance;
use crate::types::AutoMuteConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Shortest allowed progress tick
pub const MIN_TICK_INTERVAL_MS: u64 = 200;

/// Longest allowed progress tick
pub const MAX_TICK_INTERVAL_MS: u64 = 250;

/// Configuration for the playback engine and session
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlayerConfig {
    /// Progress sampling interval (200-250 ms)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Balance applied at startup (0.0 = music only, 1.0 = calls only)
    #[serde(default = "default_initial_balance")]
    pub initial_balance: f32,

    /// Auto-mute thresholds
    #[serde(default)]
    pub auto_mute: AutoMuteConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            initial_balance: default_initial_balance(),
            auto_mute: AutoMuteConfig::default(),
        }
    }
}

impl PlayerConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            if path.exists() {
                settings = settings.add_source(config::File::from(path));
            } else {
                tracing::debug!("Config file {:?} not found, using defaults", path);
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("PROMENADE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        Ok(config.normalized())
    }

    /// Clamp values into their valid ranges
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.tick_interval_ms = self
            .tick_interval_ms
            .clamp(MIN_TICK_INTERVAL_MS, MAX_TICK_INTERVAL_MS);
        self.initial_balance = clamp_balance(self.initial_balance);
        self
    }

    /// Progress tick interval
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(
            self.tick_interval_ms
                .clamp(MIN_TICK_INTERVAL_MS, MAX_TICK_INTERVAL_MS),
        )
    }
}

fn default_tick_interval_ms() -> u64 {
    MIN_TICK_INTERVAL_MS
}

fn default_initial_balance() -> f32 {
    0.5
}
