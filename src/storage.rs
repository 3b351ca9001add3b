//! Durable key-value storage.
//!
//! The store is the only writer of its key. Two processes pointed at the same
//! namespace race and the last writer wins; nothing detects the conflict.

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tracing::{debug, trace};

use crate::{config, error::StoreError};

/// A flat string namespace. Calls are synchronous and fail fast; nothing retries.
pub trait Storage: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removing a key that does not exist is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// Approximate number of bytes used by the namespace.
    fn usage_bytes(&self) -> u64;
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Uses the platform data directory, e.g. `~/.local/share/hydratrack` on Linux.
    pub fn open_default() -> Result<Self, StoreError> {
        config::data_dir().map(Self::new).ok_or(StoreError::NoDataDir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        self.dir.join(format!("{file_name}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        trace!(path = %path.display(), "Reading record");

        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        fs::create_dir_all(&self.dir)?;

        // Write next to the target, then rename over it
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, value)?;
        fs::rename(&temp_path, &path)?;

        debug!(path = %path.display(), bytes = value.len(), "Record written");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Record removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn usage_bytes(&self) -> u64 {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return 0;
        };

        entries
            .flatten()
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "json"))
            .filter_map(|entry| entry.metadata().ok())
            .map(|meta| meta.len())
            .sum()
    }
}

/// In-process storage with an optional byte quota. Clones share the same
/// entries and quota.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects writes that would push the namespace past `limit` bytes
    /// (keys plus values).
    pub fn with_quota(limit: usize) -> Self {
        let storage = Self::default();
        storage.set_quota(Some(limit));
        storage
    }

    pub fn set_quota(&self, limit: Option<usize>) {
        self.inner().quota = limit;
    }

    pub fn is_empty(&self) -> bool {
        self.inner().entries.is_empty()
    }

    fn inner(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner().entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut inner = self.inner();

        if let Some(limit) = inner.quota {
            let others: usize = inner
                .entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();

            if needed > limit {
                return Err(StoreError::QuotaExceeded { needed, limit });
            }
        }

        inner.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.inner().entries.remove(key);
        Ok(())
    }

    fn usage_bytes(&self) -> u64 {
        self.inner()
            .entries
            .iter()
            .map(|(k, v)| (k.len() + v.len()) as u64)
            .sum()
    }
}
