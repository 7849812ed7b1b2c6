//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, evictions and
//! approximate memory usage, plus the derived diagnostic view.

use serde::Serialize;

// == Cache Metrics ==
/// Raw counters for one cache instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheMetrics {
    /// Number of `get` calls that returned a live entry
    pub hits: u64,
    /// Number of `get` calls that found nothing or an expired entry
    pub misses: u64,
    /// Number of entries removed under memory pressure
    pub evictions: u64,
    /// Sum of estimated entry sizes in bytes
    pub total_memory_used: usize,
    /// Number of live entries
    pub total_entries: usize,
}

impl CacheMetrics {
    // == Constructor ==
    /// Creates a new CacheMetrics with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Entry Accounting ==
    /// Accounts for a newly inserted entry of `size` bytes.
    pub fn record_insert(&mut self, size: usize) {
        self.total_entries += 1;
        self.total_memory_used = self.total_memory_used.saturating_add(size);
    }

    /// Accounts for a removed entry of `size` bytes. Never goes below zero.
    pub fn record_removal(&mut self, size: usize) {
        self.total_entries = self.total_entries.saturating_sub(1);
        self.total_memory_used = self.total_memory_used.saturating_sub(size);
    }

    /// Resets the memory and entry totals, keeping the cumulative counters.
    pub fn reset_usage(&mut self) {
        self.total_entries = 0;
        self.total_memory_used = 0;
    }

    // == Hit Rate ==
    /// Hit rate as a percentage, or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64 * 100.0
        }
    }
}

// == Cache Stats ==
/// Derived, read-only diagnostic view of one cache instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    #[serde(flatten)]
    pub metrics: CacheMetrics,
    /// Percentage of `get` calls that hit
    pub hit_rate: f64,
    /// Memory used as a percentage of the ceiling
    pub memory_usage_percent: f64,
    pub entry_count: usize,
    /// Mean estimated entry size in bytes
    pub average_entry_size: f64,
}

impl CacheStats {
    /// Builds the derived view from raw counters and the memory ceiling.
    pub fn from_metrics(metrics: CacheMetrics, max_memory_bytes: usize) -> Self {
        let memory_usage_percent = if max_memory_bytes == 0 {
            0.0
        } else {
            metrics.total_memory_used as f64 / max_memory_bytes as f64 * 100.0
        };
        let average_entry_size = if metrics.total_entries == 0 {
            0.0
        } else {
            metrics.total_memory_used as f64 / metrics.total_entries as f64
        };

        Self {
            hit_rate: metrics.hit_rate(),
            memory_usage_percent,
            entry_count: metrics.total_entries,
            average_entry_size,
            metrics,
        }
    }
}
