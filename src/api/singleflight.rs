//! Coalesces concurrent fetches of the same cache key
//!
//! When several callers miss the cache for one key at the same moment, only
//! the first should reach the upstream API; the rest wait for its outcome.
//! The first caller to join a key becomes the leader and owes a
//! `complete` call; everyone else receives the broadcast outcome, success
//! and failure alike. Failures are shared but never cached.
//!
//! The leader holds the channel's only sender, so a leader dropped without
//! completing closes the channel instead of stranding its waiters.

use crate::api::error::ApiError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::{broadcast, Mutex};
use tracing::debug;

/// Outcome of one upstream fetch, shared with every coalesced caller
pub type FetchOutcome = Result<Value, ApiError>;

/// How a caller joined an in-flight fetch
#[derive(Debug)]
pub enum FlightRole {
    /// No fetch was in flight; this caller performs it and must hand the
    /// sender back through [`SingleFlight::complete`] with the outcome
    Leader(broadcast::Sender<FetchOutcome>),
    /// Another caller is already fetching; await the shared outcome
    Waiter(broadcast::Receiver<FetchOutcome>),
}

/// Snapshot of coalescing activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SingleFlightStats {
    /// Joins observed in total
    pub total: u64,
    /// Joins that led a new fetch
    pub led: u64,
    /// Joins coalesced onto an existing fetch
    pub coalesced: u64,
}

#[derive(Debug, Default)]
struct Counters {
    total: AtomicU64,
    led: AtomicU64,
    coalesced: AtomicU64,
}

/// Per-key coalescing of in-flight fetches
///
/// Cheap to clone; clones share the same in-flight table, so one instance
/// per client is enough to cover every caller in the process.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    inflight: Arc<Mutex<HashMap<String, broadcast::Receiver<FetchOutcome>>>>,
    counters: Arc<Counters>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins the flight for `key`, creating one if none is in progress
    ///
    /// The leader must eventually call [`complete`](Self::complete), in
    /// success and failure alike. A leader dropped instead closes the
    /// channel, and waiters see the closure rather than hang.
    pub async fn join(&self, key: &str) -> FlightRole {
        self.counters.total.fetch_add(1, Ordering::Relaxed);
        let mut inflight = self.inflight.lock().await;
        if let Some(handle) = inflight.get_mut(key) {
            // A live flight's channel is always empty here (completion
            // retires the entry before broadcasting), so anything but
            // Empty means the leader was dropped without completing.
            match handle.try_recv() {
                Err(TryRecvError::Empty) => {
                    self.counters.coalesced.fetch_add(1, Ordering::Relaxed);
                    debug!(key, "coalescing onto in-flight fetch");
                    return FlightRole::Waiter(handle.resubscribe());
                }
                _ => {
                    debug!(key, "retiring abandoned fetch");
                    inflight.remove(key);
                }
            }
        }
        // Capacity 1: a flight only ever broadcasts its single outcome
        let (sender, handle) = broadcast::channel(1);
        inflight.insert(key.to_string(), handle);
        self.counters.led.fetch_add(1, Ordering::Relaxed);
        FlightRole::Leader(sender)
    }

    /// Broadcasts the outcome to every waiter and retires the flight
    ///
    /// The entry is removed before the send, so joins arriving after the
    /// outcome is out start a fresh flight.
    pub async fn complete(
        &self,
        key: &str,
        sender: broadcast::Sender<FetchOutcome>,
        outcome: FetchOutcome,
    ) {
        self.inflight.lock().await.remove(key);
        // Send only fails when no waiter subscribed, which is fine
        let _ = sender.send(outcome);
    }

    /// Number of fetches currently in flight
    pub async fn in_flight(&self) -> usize {
        self.inflight.lock().await.len()
    }

    pub fn stats(&self) -> SingleFlightStats {
        SingleFlightStats {
            total: self.counters.total.load(Ordering::Relaxed),
            led: self.counters.led.load(Ordering::Relaxed),
            coalesced: self.counters.coalesced.load(Ordering::Relaxed),
        }
    }
}
