//! User preference storage
//!
//! Preferences are string key-value pairs. The JSON-file store keeps them in
//! one flat object and rewrites the file on every change.

use crate::Result;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// Preference key constants
/// Folder the catalog was last loaded from
pub const PREF_LAST_FOLDER: &str = "catalog.last_folder";

/// Storage key of the last selected playlist
pub const PREF_LAST_PLAYLIST: &str = "catalog.last_playlist";

/// Key-value preference store
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Preferences persisted in a JSON file
#[derive(Debug)]
pub struct JsonFilePreferences {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonFilePreferences {
    /// Open (or start) the store at `path`
    ///
    /// A missing file starts empty. A corrupt file is logged and replaced on
    /// the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.is_file() {
            let text = fs::read_to_string(&path)?;
            match serde_json::from_str::<Map<String, Value>>(&text) {
                Ok(values) => values,
                Err(e) => {
                    warn!("Ignoring unreadable preferences {}: {}", path.display(), e);
                    Map::new()
                }
            }
        } else {
            Map::new()
        };

        debug!("Opened preferences {} ({} keys)", path.display(), values.len());
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.values)?)?;
        Ok(())
    }
}

impl PreferenceStore for JsonFilePreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .values
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values
            .insert(key.to_string(), Value::String(value.to_string()));
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

/// Preferences kept in memory only
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: HashMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}
