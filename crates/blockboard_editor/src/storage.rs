// SPDX-License-Identifier: MIT OR Apache-2.0
//! Named storage slots.
//!
//! A slot holds one serialized document under a string key, the way the
//! browser canvas uses local storage. Writes overwrite unconditionally.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Extension of slot files written by [`FileStorage`]
pub const SLOT_EXTENSION: &str = "json";

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key cannot be used as a slot name
    #[error("Invalid slot key: {0:?}")]
    InvalidKey(String),
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Key/value store of serialized documents
pub trait SlotStorage {
    /// Read a slot. `None` when the slot does not exist.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Write a slot, replacing any previous value
    fn write(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove a slot. Returns whether it existed.
    fn remove(&mut self, key: &str) -> Result<bool>;

    /// List slot keys in sorted order
    fn keys(&self) -> Result<Vec<String>>;
}

/// Slot keys become file names, so keep them to a safe alphabet
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// In-memory slots
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: BTreeMap<String, String>,
}

impl MemoryStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        validate_key(key)?;
        Ok(self.slots.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.slots.keys().cloned().collect())
    }
}

/// One `<key>.json` file per slot inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn slot_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{SLOT_EXTENSION}")))
    }
}

impl SlotStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        std::fs::create_dir_all(&self.dir)?;

        // Readers see either the old or the new slot, never a partial write
        let tmp = path.with_extension(format!("{SLOT_EXTENSION}.tmp"));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        let path = self.slot_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SLOT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}
