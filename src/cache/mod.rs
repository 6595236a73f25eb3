//! Cache module for storing API responses to disk
//!
//! This module layers a freshness policy over a durable JSON-backed store.
//! Fresh responses are served without touching the network; expired entries
//! are evicted on the read that discovers them, so staleness never leaks to
//! callers and the backing file stays pruned.

mod manager;
mod policy;
mod store;

pub use manager::{CacheEntryInfo, CacheManager};
pub use policy::{ExpiryPolicy, DEFAULT_TTL_HOURS};
pub use store::{CacheEntry, CacheStore};
