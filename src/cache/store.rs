//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with size accounting, tag
//! matching, TTL expiration and write-order eviction under a memory ceiling.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::eviction::oldest_write;
use crate::cache::{estimate_size, CacheConfig, CacheConfigUpdate, CacheEntry, CacheMetrics, CacheStats};
use crate::error::{CacheError, Result};

// == Lookup ==
/// Outcome of a cache read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    /// Live entry found
    Hit(V),
    /// No entry under the key
    Miss,
    /// An entry existed but its TTL had elapsed; it has been removed
    Expired,
}

impl<V> Lookup<V> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }

    /// Collapses misses and expirations into `None`.
    pub fn into_option(self) -> Option<V> {
        match self {
            Lookup::Hit(value) => Some(value),
            Lookup::Miss | Lookup::Expired => None,
        }
    }
}

// == Set Options ==
/// Per-write overrides for [`CacheStore::set`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// TTL for this entry; the store's default TTL applies when None
    pub ttl: Option<Duration>,
    /// Invalidation tags for this entry
    pub tags: Vec<String>,
}

impl SetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

// == Cache Store ==
/// Bounded, expiring, taggable key/value storage.
///
/// Not thread-safe on its own; [`crate::cache::CacheManager`] wraps it in a lock.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Instance name used in logs
    name: String,
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Estimated size of each entry, recorded at write time
    sizes: HashMap<String, usize>,
    /// Performance counters and usage totals
    metrics: CacheMetrics,
    config: CacheConfig,
    /// Next write sequence number
    next_sequence: u64,
    destroyed: bool,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store with the given name and configuration.
    pub fn new(name: impl Into<String>, config: CacheConfig) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
            sizes: HashMap::new(),
            metrics: CacheMetrics::new(),
            config,
            next_sequence: 0,
            destroyed: false,
        }
    }

    // == Set ==
    /// Stores `data` under `key`, replacing any previous entry.
    ///
    /// Entries are evicted oldest-write-first until the new entry fits under
    /// the memory ceiling. If the store empties first, the entry is inserted
    /// anyway: the ceiling is a soft target.
    pub fn set(&mut self, key: impl Into<String>, data: V, options: SetOptions) -> Result<()>
    where
        V: Serialize,
    {
        let key = key.into();
        if self.destroyed {
            warn!("[{}] set '{}' on destroyed cache", self.name, key);
            return Err(CacheError::Destroyed(self.name.clone()));
        }
        if key.is_empty() {
            return Err(CacheError::InvalidKey("key cannot be empty".to_string()));
        }

        let size = estimate_size(&data);

        // Replacement must not double-count memory
        self.remove_entry(&key);
        self.evict_for(size);

        let ttl = options.ttl.unwrap_or(self.config.default_ttl);
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let entry = CacheEntry::new(
            key.clone(),
            data,
            ttl,
            options.tags.into_iter().collect(),
            sequence,
        );
        self.entries.insert(key.clone(), entry);
        self.sizes.insert(key, size);
        self.metrics.record_insert(size);

        Ok(())
    }

    // == Get ==
    /// Retrieves a live entry, removing it first if it has expired.
    pub fn get(&mut self, key: &str) -> Lookup<V>
    where
        V: Clone,
    {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                let data = entry.data.clone();
                self.record_hit();
                Lookup::Hit(data)
            }
            Some(_) => {
                self.remove_entry(key);
                self.record_miss();
                debug!("[{}] lazily expired '{}'", self.name, key);
                Lookup::Expired
            }
            None => {
                self.record_miss();
                Lookup::Miss
            }
        }
    }

    // == Has ==
    /// Existence check with the same expiry rule as `get`, without hit/miss accounting.
    pub fn has(&mut self, key: &str) -> bool {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => true,
            Some(_) => {
                self.remove_entry(key);
                false
            }
            None => false,
        }
    }

    // == Remove ==
    /// Removes an entry by key. Returns whether anything was removed.
    ///
    /// Never counted as an eviction.
    pub fn remove(&mut self, key: &str) -> bool {
        self.remove_entry(key).is_some()
    }

    // == Remove By Tags ==
    /// Removes every entry carrying at least one of `tags`.
    ///
    /// Returns the number of entries removed.
    pub fn remove_by_tags<S: AsRef<str>>(&mut self, tags: &[S]) -> usize {
        if tags.is_empty() {
            return 0;
        }

        let matching: Vec<String> = self
            .entries
            .values()
            .filter(|entry| entry.has_any_tag(tags))
            .map(|entry| entry.key.clone())
            .collect();

        let count = matching.len();
        for key in matching {
            self.remove_entry(&key);
        }
        count
    }

    // == Clear ==
    /// Empties the store and returns how many entries were dropped.
    ///
    /// Cumulative hit/miss/eviction counters are kept.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.sizes.clear();
        self.metrics.reset_usage();
        count
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup(&mut self) -> usize {
        let now = Instant::now();
        let expired_keys: Vec<String> = self
            .entries
            .values()
            .filter(|entry| entry.is_expired_at(now))
            .map(|entry| entry.key.clone())
            .collect();

        let count = expired_keys.len();
        for key in expired_keys {
            self.remove_entry(&key);
        }
        count
    }

    // == Metrics ==
    /// Returns a snapshot of the raw counters.
    pub fn metrics(&self) -> CacheMetrics {
        self.metrics.clone()
    }

    // == Stats ==
    /// Returns the derived diagnostic view.
    pub fn stats(&self) -> CacheStats {
        CacheStats::from_metrics(self.metrics.clone(), self.config.max_memory_bytes)
    }

    // == Config ==
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Applies a partial config update. Returns true if the cleanup interval changed.
    ///
    /// New limits apply to later operations; nothing is evicted retroactively.
    pub fn update_config(&mut self, update: &CacheConfigUpdate) -> bool {
        self.config.apply(update)
    }

    // == Destroy ==
    /// Clears the store and refuses further writes.
    pub fn destroy(&mut self) {
        self.clear();
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // == Length ==
    /// Returns the number of entries, including expired ones not yet reclaimed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recorded size of the entry under `key`, if present.
    pub fn entry_size(&self, key: &str) -> Option<usize> {
        self.sizes.get(key).copied()
    }

    // == Internal Helpers ==
    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        let size = self.sizes.remove(key).unwrap_or(0);
        self.metrics.record_removal(size);
        Some(entry)
    }

    fn evict_for(&mut self, incoming: usize) {
        while self.metrics.total_memory_used.saturating_add(incoming) > self.config.max_memory_bytes {
            let victim = match oldest_write(&self.entries) {
                Some(key) => key,
                None => break,
            };
            self.remove_entry(&victim);
            if self.config.enable_metrics {
                self.metrics.record_eviction();
            }
            debug!("[{}] evicted '{}' under memory pressure", self.name, victim);
        }
    }

    fn record_hit(&mut self) {
        if self.config.enable_metrics {
            self.metrics.record_hit();
        }
    }

    fn record_miss(&mut self) {
        if self.config.enable_metrics {
            self.metrics.record_miss();
        }
    }
}
