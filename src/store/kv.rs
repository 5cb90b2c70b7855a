//! Durable string key-value storage.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::core::ChatError;

const STORE_DIR: &str = "sparkchat";
const STORE_FILE: &str = "storage.json";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ChatError>;

    fn set(&self, key: &str, value: &str) -> Result<(), ChatError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), ChatError>;
}

/// In-memory store. Clones share the same map, so a clone handed to a new
/// session behaves like the same store after a reload.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ChatError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ChatError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ChatError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// Every read goes to disk. Writes go through a temporary file that is
/// synced and renamed over the original, so readers see either the old or
/// the new contents.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// `<config_dir>/sparkchat/storage.json`
    pub fn default_location() -> Result<Self, ChatError> {
        let config_dir = dirs::config_dir().ok_or_else(|| ChatError::Storage {
            message: "Failed to determine the user config directory".to_string(),
            source: None,
        })?;
        Ok(Self::new(config_dir.join(STORE_DIR).join(STORE_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, ChatError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            ChatError::storage(format!("Failed to read '{}'", self.path.display()), e)
        })?;

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            ChatError::storage(format!("Failed to parse '{}'", self.path.display()), e)
        })
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), ChatError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ChatError::storage(format!("Failed to create '{}'", parent.display()), e)
            })?;
        }

        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| ChatError::storage("Failed to serialize store", e))?;

        let tmp_path = self.path.with_extension("json.tmp");
        let mut tmp_file = File::create(&tmp_path).map_err(|e| {
            ChatError::storage(format!("Failed to create '{}'", tmp_path.display()), e)
        })?;

        tmp_file.write_all(json.as_bytes()).map_err(|e| {
            ChatError::storage(format!("Failed to write '{}'", tmp_path.display()), e)
        })?;

        tmp_file.sync_all().map_err(|e| {
            ChatError::storage(format!("Failed to sync '{}'", tmp_path.display()), e)
        })?;

        drop(tmp_file);

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            ChatError::storage(
                format!(
                    "Failed to rename '{}' to '{}'",
                    tmp_path.display(),
                    self.path.display()
                ),
                e,
            )
        })?;

        debug!(path = %self.path.display(), "Store written");
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), ChatError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        apply(&mut entries);
        self.save(&entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ChatError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ChatError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), ChatError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let reloaded = store.clone();

        store.set("hf_token", "hf_abc").unwrap();
        assert_eq!(reloaded.get("hf_token").unwrap().as_deref(), Some("hf_abc"));

        reloaded.remove("hf_token").unwrap();
        assert_eq!(store.get("hf_token").unwrap(), None);
    }

    #[test]
    fn file_store_survives_a_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        FileStore::new(&path).set("hf_token", "hf_abc").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("hf_token").unwrap().as_deref(), Some("hf_abc"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn file_store_keeps_other_keys_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("storage.json"));

        store.set("theme", "dark").unwrap();
        store.set("hf_token", "hf_abc").unwrap();
        store.remove("hf_token").unwrap();

        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(store.get("hf_token").unwrap(), None);
    }

    #[test]
    fn missing_or_empty_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let store = FileStore::new(&path);

        assert_eq!(store.get("hf_token").unwrap(), None);
        store.remove("hf_token").unwrap();

        fs::write(&path, "  \n").unwrap();
        assert_eq!(store.get("hf_token").unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json").unwrap();

        let err = FileStore::new(&path).get("hf_token").unwrap_err();
        assert!(matches!(err, ChatError::Storage { .. }));
    }
}
