// SPDX-License-Identifier: MPL-2.0

//! Persisted session state
//!
//! The booth keeps two entries in a small key-value store: the photo set (a
//! JSON array of data URIs) and the sound preference. [`FileStore`] keeps one
//! file per key under the data directory; [`MemoryStore`] backs tests and
//! throwaway sessions.

mod photos;
mod preferences;

pub use photos::{AppendOutcome, Photo, PhotoStore};
pub use preferences::Preferences;

use crate::errors::{AppError, AppResult};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::debug;

/// Photo set index or capacity violation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PhotoSetError {
    /// Append attempted on a complete set
    #[error("Photo strip already has {capacity} photos")]
    Full { capacity: usize },
    /// Retake or delete aimed past the end of the set
    #[error("No photo at position {} (strip has {len})", .index + 1)]
    IndexOutOfRange { index: usize, len: usize },
}

/// String key-value storage shared between the photo store and preferences
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Removing a missing key is not an error
    fn remove(&self, key: &str) -> AppResult<()>;
}

/// One file per key under a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> AppResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(AppError::Storage(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => Err(
                AppError::PersistenceCorrupt(format!("{} is not valid UTF-8", key)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;

        // Write then rename so a crash never leaves a half-written entry
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        debug!(key, bytes = value.len(), "Stored entry");
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store; clones share the same entries
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
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.get("photobooth-sound").unwrap(), None);
        store.set("photobooth-sound", "false").unwrap();
        assert_eq!(
            store.get("photobooth-sound").unwrap().as_deref(),
            Some("false")
        );
        assert!(!dir.path().join("nested/photobooth-sound.tmp").exists());

        store.remove("photobooth-sound").unwrap();
        store.remove("photobooth-sound").unwrap();
        assert_eq!(store.get("photobooth-sound").unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(
            store.set("../escape", "x"),
            Err(AppError::Storage(_))
        ));
    }

    #[test]
    fn test_memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let handle = store.clone();
        store.set("k", "v").unwrap();
        assert_eq!(handle.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_index_error_is_one_based() {
        let err = PhotoSetError::IndexOutOfRange { index: 2, len: 2 };
        assert_eq!(err.to_string(), "No photo at position 3 (strip has 2)");
    }
}
