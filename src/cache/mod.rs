//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, tag invalidation and
//! write-order eviction under an approximate memory ceiling.

mod config;
mod entry;
mod eviction;
mod manager;
mod size;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use config::{CacheConfig, CacheConfigUpdate, BYTES_PER_MB};
pub use entry::CacheEntry;
pub use eviction::oldest_write;
pub use manager::CacheManager;
pub use size::{estimate_size, FALLBACK_ENTRY_SIZE};
pub use stats::{CacheMetrics, CacheStats};
pub use store::{CacheStore, Lookup, SetOptions};
