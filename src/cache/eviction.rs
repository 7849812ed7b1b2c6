//! Eviction Module
//!
//! Victim selection for memory-pressure eviction.
//!
//! Priority is by write recency only: the entry whose last `set` is oldest
//! goes first. Reads do not refresh an entry's position.

use std::collections::HashMap;

use crate::cache::CacheEntry;

// == Oldest Write ==
/// Returns the key of the entry with the oldest write, or None if empty.
///
/// Scans every entry; ties on timestamp are broken by write sequence.
pub fn oldest_write<V>(entries: &HashMap<String, CacheEntry<V>>) -> Option<String> {
    entries
        .values()
        .min_by_key(|entry| entry.write_order())
        .map(|entry| entry.key.clone())
}
