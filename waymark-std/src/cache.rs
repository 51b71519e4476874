//! Route cache implementations.
//!
//! - [`MemoryCache`]: in-process, writes land immediately
//! - [`FileCache`]: one JSON file per key, creation time is the file's
//!   modification time, writes are buffered until [`FileCache::commit`]

use crate::error::CacheError;
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
    time::SystemTime,
};
use waymark_core::{BoxError, CacheItem, RouteCache};

// ============================================================================
// Memory Cache
// ============================================================================

/// An in-process route cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (SystemTime, String)>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `payload` with an explicit creation time.
    pub fn insert_at(&self, key: impl Into<String>, payload: impl Into<String>, created_at: SystemTime) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), (created_at, payload.into()));
    }

    /// Remove `key`, returning whether it was present.
    pub fn remove(&self, key: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RouteCache for MemoryCache {
    fn get_item(&self, key: &str) -> Result<CacheItem, BoxError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(match entries.get(key) {
            Some((created_at, payload)) => CacheItem::hit(key, payload.clone(), *created_at),
            None => CacheItem::miss(key),
        })
    }

    fn save_deferred(&self, key: &str, payload: String) -> Result<(), BoxError> {
        self.insert_at(key, payload, SystemTime::now());
        Ok(())
    }
}

// ============================================================================
// File Cache
// ============================================================================

/// A route cache storing one JSON file per key in a directory.
///
/// Deferred writes are buffered in memory and remain visible to
/// [`get_item`](RouteCache::get_item) until they are written out by
/// [`commit`](Self::commit). Dropping the cache commits; errors at that point
/// are logged and otherwise lost.
///
/// # Example
///
/// ```rust,ignore
/// let cache = FileCache::new("var/cache");
/// cache.save_deferred("_routes", payload)?;
/// cache.commit()?;
/// ```
#[derive(Debug)]
pub struct FileCache {
    dir: PathBuf,
    pending: Mutex<HashMap<String, (SystemTime, String)>>,
}

impl FileCache {
    /// A cache rooted at `dir`. The directory is created on first commit.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// The cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file}.json"))
    }

    /// Number of writes not yet committed.
    pub fn pending(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Write every pending entry to disk.
    pub fn commit(&self) -> Result<(), CacheError> {
        let pending: Vec<_> = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .collect();
        if pending.is_empty() {
            return Ok(());
        }

        fs::create_dir_all(&self.dir)?;
        for (key, (_, payload)) in pending {
            let contents = serde_json::to_vec(&json!({ "key": &key, "payload": &payload }))?;
            fs::write(self.path_for(&key), contents)?;

            #[cfg(feature = "tracing")]
            {
                tracing::debug!(key = %key, dir = %self.dir.display(), "Cache entry written");
            }
        }
        Ok(())
    }

    fn read(&self, key: &str) -> Result<CacheItem, CacheError> {
        let path = self.path_for(key);
        let contents = match fs::read(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(CacheItem::miss(key)),
            Err(e) => return Err(e.into()),
        };
        let created_at = fs::metadata(&path)?.modified()?;

        match decode(&contents) {
            Ok(payload) => Ok(CacheItem::hit(key, payload, created_at)),
            Err(_error) => {
                // A torn write is rewritten by the next deferred save.
                #[cfg(feature = "tracing")]
                {
                    tracing::warn!(key = %key, path = %path.display(), error = %_error, "Cache entry is unreadable; treating as a miss");
                }
                Ok(CacheItem::miss(key))
            }
        }
    }
}

fn decode(contents: &[u8]) -> Result<String, serde_json::Error> {
    let mut entry: Value = serde_json::from_slice(contents)?;
    let payload = entry.get_mut("payload").map(Value::take).unwrap_or_default();
    serde_json::from_value(payload)
}

impl RouteCache for FileCache {
    fn get_item(&self, key: &str) -> Result<CacheItem, BoxError> {
        if let Some((created_at, payload)) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return Ok(CacheItem::hit(key, payload.clone(), *created_at));
        }

        Ok(self.read(key)?)
    }

    fn save_deferred(&self, key: &str, payload: String) -> Result<(), BoxError> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), (SystemTime::now(), payload));
        Ok(())
    }
}

impl Drop for FileCache {
    fn drop(&mut self) {
        if let Err(_error) = self.commit() {
            #[cfg(feature = "tracing")]
            {
                tracing::warn!(error = %_error, dir = %self.dir.display(), "Failed to commit route cache");
            }
        }
    }
}
