//! Freshness policy for cached API responses
//!
//! Pure age arithmetic with no clock access of its own; callers supply both
//! timestamps, which keeps every decision reproducible in tests.

use chrono::{DateTime, Duration, Utc};

/// Default freshness window for cached responses
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Decides whether a cached entry is still fresh
///
/// An entry is fresh while its age is strictly below the window: an entry
/// written at the evaluation instant is fresh under any positive window,
/// and one aged exactly the window length is already stale. A zero window
/// therefore disables caching outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    ttl: Duration,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::hours(DEFAULT_TTL_HOURS),
        }
    }
}

impl ExpiryPolicy {
    /// Creates a policy with a specific freshness window
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// Returns the freshness window
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether an entry written at `stored_at` is still fresh at `now`
    ///
    /// A `stored_at` in the future (clock skew across restarts) yields a
    /// negative age, which always counts as fresh under a positive window.
    pub fn is_fresh(&self, stored_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(stored_at) < self.ttl
    }

    /// Complement of [`is_fresh`](Self::is_fresh)
    pub fn is_expired(&self, stored_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        !self.is_fresh(stored_at, now)
    }
}
