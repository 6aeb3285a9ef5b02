//! Key-value persistence for the configured duration

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    io::ErrorKind,
    path::PathBuf,
};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::state::TargetSeconds;

/// Storage key holding the configured duration as text
pub const TARGET_SECONDS_KEY: &str = "timer.target-seconds";

/// String key-value storage
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store persisted as a flat JSON object in a single file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // A corrupt file is replaced rather than blocking every later save
        let mut entries = self.read_all().unwrap_or_else(|e| {
            warn!("Discarding unreadable store: {:#}", e);
            BTreeMap::new()
        });
        entries.insert(key.to_string(), value.to_string());

        let json = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

/// Load the configured duration, falling back to the default when the value
/// is absent, unreadable or not a positive integer
pub fn load_target_seconds(store: &dyn KeyValueStore) -> TargetSeconds {
    match store.get(TARGET_SECONDS_KEY) {
        Ok(Some(raw)) => raw.parse().unwrap_or_else(|e| {
            warn!("Ignoring stored duration: {}", e);
            TargetSeconds::default()
        }),
        Ok(None) => {
            debug!("No stored duration, using default");
            TargetSeconds::default()
        }
        Err(e) => {
            warn!("Failed to load stored duration: {:#}", e);
            TargetSeconds::default()
        }
    }
}

pub fn save_target_seconds(store: &mut dyn KeyValueStore, target: TargetSeconds) -> Result<()> {
    store.set(TARGET_SECONDS_KEY, &target.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default() {
        assert_eq!(load_target_seconds(&MemoryStore::new()).get(), 5);
        for raw in ["abc", "0", "-4", ""] {
            let store = MemoryStore::with_entry(TARGET_SECONDS_KEY, raw);
            assert_eq!(load_target_seconds(&store).get(), 5, "raw {raw:?}");
        }
    }

    #[test]
    fn saved_value_is_loaded_back() {
        let mut store = MemoryStore::new();
        save_target_seconds(&mut store, TargetSeconds::new(42).unwrap()).unwrap();
        assert_eq!(store.get(TARGET_SECONDS_KEY).unwrap().as_deref(), Some("42"));
        assert_eq!(load_target_seconds(&store).get(), 42);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut store = FileStore::new(&path);
        assert_eq!(store.get(TARGET_SECONDS_KEY).unwrap(), None);
        save_target_seconds(&mut store, TargetSeconds::new(12).unwrap()).unwrap();
        store.set("other", "value").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(load_target_seconds(&reopened).get(), 12);
        assert_eq!(reopened.get("other").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn corrupt_file_falls_back_and_is_replaced_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json").unwrap();

        let mut store = FileStore::new(&path);
        assert!(store.get(TARGET_SECONDS_KEY).is_err());
        assert_eq!(load_target_seconds(&store).get(), 5);

        save_target_seconds(&mut store, TargetSeconds::new(8).unwrap()).unwrap();
        assert_eq!(load_target_seconds(&store).get(), 8);
    }
}
