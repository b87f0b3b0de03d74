// src/prefs.rs
//! Key-value preference storage for the satellite filter toggles

use crate::error::{Result, SkyviewError};
use log::debug;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Boolean key-value store the filter toggles are persisted in
pub trait PreferenceStore {
    fn get_bool(&self, key: &str, default: bool) -> bool;

    fn set_bool(&mut self, key: &str, value: bool);

    /// Make pending writes durable
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: BTreeMap<String, bool>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), value);
    }
}

/// Preferences kept as a flat JSON object on disk
#[derive(Debug, Clone)]
pub struct JsonPreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, bool>,
}

impl JsonPreferenceStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents).map_err(|e| {
                SkyviewError::Parse(format!(
                    "Failed to parse preferences {}: {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            debug!("No preferences at {}, using defaults", path.display());
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    /// Open the store at the default per-user location
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(crate::config::config_dir()?.join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), value);
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, contents)?;
        debug!("Saved preferences to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("gnss-skyview-{}-{}", std::process::id(), name))
            .join("preferences.json")
    }

    #[test]
    fn test_memory_store_defaults() {
        let mut store = MemoryPreferenceStore::new();
        assert!(store.get_bool("gpsChecked", true));
        assert!(!store.get_bool("gpsChecked", false));
        store.set_bool("gpsChecked", false);
        assert!(!store.get_bool("gpsChecked", true));
    }

    #[test]
    fn test_json_store_persists() {
        let path = scratch_path("persist");
        let _ = std::fs::remove_file(&path);

        let mut store = JsonPreferenceStore::open(&path).unwrap();
        assert!(store.get_bool("usedInFix", true));
        store.set_bool("usedInFix", false);
        store.flush().unwrap();

        let reopened = JsonPreferenceStore::open(&path).unwrap();
        assert!(!reopened.get_bool("usedInFix", true));
        assert!(reopened.get_bool("notUsedInFix", true));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_json_store_rejects_garbage() {
        let path = scratch_path("garbage");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        let result = JsonPreferenceStore::open(&path);
        assert!(matches!(result, Err(SkyviewError::Parse(_))));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
