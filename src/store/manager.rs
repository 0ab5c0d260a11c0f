//! Store manager persisting values to disk
//!
//! Provides a `StoreManager` that keeps one JSON file per key in a
//! platform-appropriate data directory. Reads treat any missing or
//! unreadable file as absent so callers can fall through to the network.

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when writing to the store
///
/// Reads never error; a failed read is reported as an absent key.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Directory creation or file write failed
    #[error("storage write failed: {0}")]
    WriteFailed(#[from] std::io::Error),

    /// Value could not be serialized to JSON
    #[error("storage serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Manages reading and writing durable key-value entries on disk
///
/// Values are stored as `{key}.json` files in an XDG-compliant data
/// directory (`~/.local/share/duaread/` on Linux). Writes are last-write-wins
/// per key; there is no expiry and no eviction.
#[derive(Debug, Clone)]
pub struct StoreManager {
    /// Directory where entries are stored
    store_dir: PathBuf,
}

impl StoreManager {
    /// Creates a new StoreManager using the platform data directory
    ///
    /// Returns `None` if the directory cannot be determined (e.g., no home
    /// directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "duaread")?;
        let store_dir = project_dirs.data_dir().to_path_buf();
        Some(Self { store_dir })
    }

    /// Creates a new StoreManager with a custom directory
    ///
    /// Useful for testing or when a specific location is needed.
    pub fn with_dir(store_dir: PathBuf) -> Self {
        Self { store_dir }
    }

    /// Returns the path to the file backing the given key
    fn entry_path(&self, key: &str) -> PathBuf {
        self.store_dir.join(format!("{}.json", key))
    }

    /// Ensures the store directory exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.store_dir)
    }

    /// Reads the raw string value for a key
    ///
    /// Returns `None` if the entry does not exist or cannot be read.
    pub fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.entry_path(key)).ok()
    }

    /// Writes the raw string value for a key, overwriting any existing entry
    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.ensure_dir()?;
        fs::write(self.entry_path(key), value)?;
        Ok(())
    }

    /// Reads and deserializes a typed value for a key
    ///
    /// Returns `None` if the entry is missing or does not parse as `T`.
    pub fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let content = self.get(key)?;
        serde_json::from_str(&content).ok()
    }

    /// Serializes and writes a typed value for a key
    pub fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value)?;
        self.set(key, &json)
    }
}
