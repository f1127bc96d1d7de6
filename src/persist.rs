//! Local key/value persistence for the reading session.
//!
//! The store keeps two keys across process restarts: the id of the last
//! open book and the selected category filter. Failures here are never
//! fatal to the caller; the store logs and moves on.

use crate::error::{AppError, Result};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Synchronous key/value store surviving process restarts.
pub trait PersistenceAdapter: Send + Sync {
    /// Read a key, `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a key, overwriting any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// File-backed persistence: a single JSON object, rewritten on every
/// mutation.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, loading existing entries if the file is
    /// present.
    pub fn open(path: &Path) -> Result<Self> {
        let entries = if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| AppError::Persistence(format!("Failed to read state file: {}", e)))?;
            serde_json::from_str(&content)
                .map_err(|e| AppError::Persistence(format!("Failed to parse state file: {}", e)))?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        })
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Persistence(format!("Failed to create state directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| AppError::Persistence(format!("Failed to encode state: {}", e)))?;

        std::fs::write(&self.path, content)
            .map_err(|e| AppError::Persistence(format!("Failed to write state file: {}", e)))
    }
}

impl PersistenceAdapter for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

/// In-memory persistence. Nothing survives the process; useful for tests
/// and for running without a writable data directory.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceAdapter for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
