//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and tag support.

use std::collections::HashSet;
use std::time::{Duration, Instant};

// == Cache Entry ==
/// Represents a single cache entry with payload and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// Key the entry is stored under
    pub key: String,
    /// The stored payload
    pub data: V,
    /// Time of the last write to this key
    pub timestamp: Instant,
    /// Lifetime measured from `timestamp`
    pub ttl: Duration,
    /// Tags used for bulk invalidation
    pub tags: HashSet<String>,
    /// Per-store write counter, breaks ties between equal timestamps
    pub sequence: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry written now.
    ///
    /// # Arguments
    /// * `key` - The key the entry is stored under
    /// * `data` - The payload
    /// * `ttl` - Lifetime of the entry
    /// * `tags` - Invalidation tags
    /// * `sequence` - Write sequence number assigned by the store
    pub fn new(
        key: String,
        data: V,
        ttl: Duration,
        tags: HashSet<String>,
        sequence: u64,
    ) -> Self {
        Self {
            key,
            data,
            timestamp: Instant::now(),
            ttl,
            tags,
            sequence,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the elapsed time is
    /// greater than or equal to its TTL, so a zero TTL expires immediately.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Same as [`is_expired`](Self::is_expired) against a caller-supplied clock reading.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.timestamp) >= self.ttl
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.ttl
            .saturating_sub(Instant::now().saturating_duration_since(self.timestamp))
    }

    // == Tag Match ==
    /// Returns true if the entry carries any of the given tags.
    pub fn has_any_tag<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        tags.iter().any(|t| self.tags.contains(t.as_ref()))
    }

    // == Write Order ==
    /// Ordering key for eviction: older writes sort first.
    pub fn write_order(&self) -> (Instant, u64) {
        (self.timestamp, self.sequence)
    }
}
