//! Cache façade combining durable storage with freshness policy
//!
//! Provides a `CacheManager` that serves cached API responses while they are
//! fresh and evicts them on the first read after expiry, so callers never
//! receive stale data and the backing file never accumulates dead entries.

use crate::cache::policy::ExpiryPolicy;
use crate::cache::store::{CacheEntry, CacheStore};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// Introspection record for one cached entry
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntryInfo {
    /// Full cache key
    pub key: String,
    /// When the entry was written
    pub cached_at: DateTime<Utc>,
    /// Age at the time of inspection, in fractional hours
    pub age_hours: f64,
    /// Whether the entry has outlived the manager's default window
    pub expired: bool,
}

/// Serves cached payloads while fresh, evicting them once expired
///
/// Reads go through a freshness check: a fresh entry is returned as-is, a
/// stale one is deleted from the store (and from disk) before reporting a
/// miss. Writes stamp the current time. The manager holds a handle to a
/// shared [`CacheStore`], so several managers or clients can sit on the
/// same backing file.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Durable entry storage
    store: CacheStore,
    /// Default freshness window for reads and introspection
    policy: ExpiryPolicy,
}

impl CacheManager {
    /// Creates a manager over `store` with the default 24 hour window
    pub fn new(store: CacheStore) -> Self {
        Self {
            store,
            policy: ExpiryPolicy::default(),
        }
    }

    /// Creates a manager with a specific default freshness window
    pub fn with_policy(store: CacheStore, policy: ExpiryPolicy) -> Self {
        Self { store, policy }
    }

    /// Returns the path of the backing file
    pub fn file(&self) -> &Path {
        self.store.file()
    }

    /// Returns the cached payload for `key` if it is still fresh
    ///
    /// Uses the manager's default window. Stale entries are evicted before
    /// the miss is reported.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_with_ttl(key, self.policy.ttl())
    }

    /// Returns the cached payload for `key` if it is fresher than `ttl`
    ///
    /// Lets callers tighten the window per request class (live aircraft
    /// positions go stale in seconds, airport directories in days) without
    /// needing a separate cache.
    pub fn get_with_ttl(&self, key: &str, ttl: Duration) -> Option<Value> {
        let entry = match self.store.read(key) {
            Some(entry) => entry,
            None => {
                debug!(key, "cache miss");
                return None;
            }
        };

        let policy = ExpiryPolicy::with_ttl(ttl);
        if policy.is_fresh(entry.stored_at, Utc::now()) {
            debug!(key, "cache hit");
            return Some(entry.payload);
        }

        debug!(key, "cache entry expired, evicting");
        if let Err(e) = self.store.delete(key) {
            warn!(key, error = %e, "failed to persist cache eviction");
        }
        None
    }

    /// Stores a payload under `key`, stamped with the current time
    pub fn set(&self, key: &str, payload: Value) -> io::Result<()> {
        self.store.write(key, CacheEntry::new(payload))
    }

    /// Removes every cached entry, on disk included
    pub fn clear(&self) -> io::Result<()> {
        self.store.clear()
    }

    /// Number of stored entries, fresh or not
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Reports every stored entry with its age and expiry status
    ///
    /// Does not evict; an operator inspecting the cache should see what is
    /// actually on disk. Entries are sorted by key for stable output.
    pub fn info(&self) -> Vec<CacheEntryInfo> {
        let now = Utc::now();
        let mut infos: Vec<CacheEntryInfo> = self
            .store
            .entries()
            .into_iter()
            .map(|(key, entry)| {
                let age = now.signed_duration_since(entry.stored_at);
                CacheEntryInfo {
                    key,
                    cached_at: entry.stored_at,
                    age_hours: age.num_seconds() as f64 / 3600.0,
                    expired: self.policy.is_expired(entry.stored_at, now),
                }
            })
            .collect();
        infos.sort_by(|a, b| a.key.cmp(&b.key));
        infos
    }
}
