//! Durable key-value store backing the API response cache
//!
//! Keeps the full key -> entry mapping in memory and mirrors it to a single
//! JSON document on disk. The document is rewritten on every mutation and
//! replaced atomically, so a crash mid-write can never corrupt future loads.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// File name of the backing document inside the cache directory
const CACHE_FILE_NAME: &str = "api_cache.json";

/// A cached upstream response together with its write timestamp
///
/// The payload is opaque to the cache: it is stored and returned verbatim,
/// never inspected or transformed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Decoded upstream response body
    pub payload: Value,
    /// When this entry was last written
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Creates an entry stamped with the current time
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            stored_at: Utc::now(),
        }
    }
}

/// Persistent mapping from cache key to [`CacheEntry`]
///
/// The store is hydrated once at construction; a missing, unreadable, or
/// corrupt backing file yields an empty mapping rather than an error.
/// Handles are cheap to clone and share the same in-memory state, so a
/// single store can back every API client in the process.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Path of the backing JSON document
    file: PathBuf,
    /// In-memory mapping, shared across clones
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl CacheStore {
    /// Creates a store backed by the XDG-compliant cache location
    ///
    /// Uses `~/.cache/skyhub/api_cache.json` on Linux, or the equivalent
    /// platform path. Returns `None` if no home directory can be determined.
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "skyhub")?;
        Some(Self::with_file(
            project_dirs.cache_dir().join(CACHE_FILE_NAME),
        ))
    }

    /// Creates a store backed by a specific file
    ///
    /// Useful for testing or when a custom cache location is needed.
    /// Existing contents are loaded immediately, best effort.
    pub fn with_file(file: PathBuf) -> Self {
        let entries = load_entries(&file);
        Self {
            file,
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    /// Returns the path of the backing file
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Returns a clone of the entry for `key`, if present
    ///
    /// Freshness is not considered here; expiry belongs to the policy layer.
    pub fn read(&self, key: &str) -> Option<CacheEntry> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    /// Upserts an entry and synchronously persists the full mapping
    pub fn write(&self, key: &str, entry: CacheEntry) -> io::Result<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), entry);
        self.persist(&entries)
    }

    /// Removes an entry, persisting if anything was removed
    ///
    /// Returns whether the key was present.
    pub fn delete(&self, key: &str) -> io::Result<bool> {
        let mut entries = self.entries.lock().unwrap();
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Empties the store and persists the empty mapping
    pub fn clear(&self) -> io::Result<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.clear();
        self.persist(&entries)
    }

    /// Returns a snapshot of all entries for introspection
    pub fn entries(&self) -> Vec<(String, CacheEntry)> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    /// Serializes the mapping and atomically replaces the backing file
    ///
    /// Writes to a sibling temp file and renames it into place, so a
    /// concurrent reader (or a crash) never observes a half-written
    /// document. Called with the entry lock held, which also serializes
    /// writers against each other.
    fn persist(&self, entries: &HashMap<String, CacheEntry>) -> io::Result<()> {
        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let tmp = self.file.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.file)
    }
}

/// Loads the persisted mapping, falling back to empty on any failure
///
/// Corruption and I/O errors are logged and absorbed; the cache always
/// starts, at worst cold.
fn load_entries(file: &Path) -> HashMap<String, CacheEntry> {
    match fs::read_to_string(file) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(file = %file.display(), error = %e, "cache file is corrupt, starting empty");
                HashMap::new()
            }
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
        Err(e) => {
            warn!(file = %file.display(), error = %e, "cache file is unreadable, starting empty");
            HashMap::new()
        }
    }
}
