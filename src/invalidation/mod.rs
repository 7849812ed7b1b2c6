//! Invalidation Module
//!
//! Maps domain write-events onto tag removals and clears across the named
//! caches.

mod events;
mod invalidator;
mod report;

pub use events::{
    DatasetUpdate, DatasourceUpdate, InvalidationEvent, MetricUpdate, ResourceType, SystemConfig,
};
pub use invalidator::CacheInvalidator;
pub use report::{AllCacheStats, InvalidationAction, InvalidationReport, InvalidationTarget};
