//! Dashboard Cache - in-process caching layer for a BI dashboard backend
//!
//! Provides memory-bounded TTL caches with tag invalidation and write-order
//! eviction, three named cache instances, and an invalidation policy that
//! maps domain write-events onto cache actions.

pub mod cache;
pub mod config;
pub mod error;
pub mod invalidation;
pub mod keys;
pub mod payload;
pub mod registry;
pub mod tasks;

pub use cache::{CacheConfig, CacheManager, Lookup, SetOptions};
pub use config::Config;
pub use error::{CacheError, Result};
pub use invalidation::CacheInvalidator;
pub use payload::CachedResult;
pub use registry::{CacheName, CacheRegistry};
