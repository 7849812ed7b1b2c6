//! Cache Registry
//!
//! The three named cache instances of the process, constructed once at
//! startup and passed explicitly to the code that uses them.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::CacheManager;
use crate::config::Config;
use crate::payload::CachedResult;
use crate::tasks::spawn_registry_sweep;

/// Cache instance holding [`CachedResult`] payloads.
pub type ResultCache = CacheManager<CachedResult>;

// == Cache Name ==
/// Identifies one of the named cache instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheName {
    /// Dataset metadata, fields and previews
    Dataset,
    /// Metric evaluation results
    Metric,
    /// Raw query results
    Query,
}

impl CacheName {
    pub const ALL: [CacheName; 3] = [CacheName::Dataset, CacheName::Metric, CacheName::Query];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheName::Dataset => "dataset",
            CacheName::Metric => "metric",
            CacheName::Query => "query",
        }
    }
}

impl fmt::Display for CacheName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Cache Registry ==
/// Owner of the named caches and of the process-wide sweep task.
#[derive(Debug)]
pub struct CacheRegistry {
    dataset: ResultCache,
    metric: ResultCache,
    query: ResultCache,
    sweep: Mutex<Option<JoinHandle<()>>>,
}

impl CacheRegistry {
    // == Constructor ==
    /// Builds the three caches from their configured settings.
    pub fn new(config: &Config) -> Self {
        Self {
            dataset: CacheManager::new(CacheName::Dataset.as_str(), config.dataset.clone()),
            metric: CacheManager::new(CacheName::Metric.as_str(), config.metric.clone()),
            query: CacheManager::new(CacheName::Query.as_str(), config.query.clone()),
            sweep: Mutex::new(None),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(&Config::default())
    }

    pub fn dataset(&self) -> &ResultCache {
        &self.dataset
    }

    pub fn metric(&self) -> &ResultCache {
        &self.metric
    }

    pub fn query(&self) -> &ResultCache {
        &self.query
    }

    pub fn get(&self, name: CacheName) -> &ResultCache {
        match name {
            CacheName::Dataset => &self.dataset,
            CacheName::Metric => &self.metric,
            CacheName::Query => &self.query,
        }
    }

    pub fn all(&self) -> [&ResultCache; 3] {
        [&self.dataset, &self.metric, &self.query]
    }

    // == Per-Instance Sweepers ==
    /// Starts each cache's own cleanup task. Returns how many were started.
    pub async fn start_sweepers(&self) -> usize {
        let mut started = 0;
        for cache in self.all() {
            if cache.start_sweeper().await {
                started += 1;
            }
        }
        started
    }

    // == Cleanup All ==
    /// Runs `cleanup` on every cache. Returns the total removed.
    pub async fn cleanup_all(&self) -> usize {
        let mut removed = 0;
        for cache in self.all() {
            removed += cache.cleanup().await;
        }
        removed
    }

    // == Process-Wide Sweep ==
    /// Starts the single sweep over all caches.
    ///
    /// Returns false when a sweep already runs, the interval is zero, or no
    /// tokio runtime is present.
    pub async fn start_sweep(self: &Arc<Self>, interval: Duration) -> bool {
        if interval.is_zero() {
            warn!("Cache sweep interval must be greater than zero, not scheduled");
            return false;
        }
        if Handle::try_current().is_err() {
            debug!("No tokio runtime, cache sweep not scheduled");
            return false;
        }

        let mut sweep = self.sweep.lock().await;
        if sweep.is_some() {
            warn!("Cache sweep already scheduled, ignoring second request");
            return false;
        }

        *sweep = Some(spawn_registry_sweep(self.clone(), interval));
        true
    }

    pub async fn sweep_running(&self) -> bool {
        self.sweep.lock().await.is_some()
    }

    // == Shutdown ==
    /// Stops the sweep and destroys every cache. Safe to call repeatedly.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.sweep.lock().await.take() {
            handle.abort();
        }
        for cache in self.all() {
            cache.destroy().await;
        }
        info!("Cache registry shut down");
    }
}
