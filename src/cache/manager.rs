//! Cache Manager Module
//!
//! Shareable async handle over one [`CacheStore`], owning that instance's
//! background sweep task.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheConfig, CacheConfigUpdate, CacheMetrics, CacheStats, CacheStore, Lookup, SetOptions};
use crate::error::{CacheError, Result};
use crate::tasks::spawn_cleanup_task;

// == Cache Manager ==
/// A named, lock-guarded cache instance.
///
/// Every method takes the store lock only for the duration of one
/// synchronous store call, so the lock is never held across an await in
/// caller code.
#[derive(Debug)]
pub struct CacheManager<V> {
    name: String,
    store: Arc<RwLock<CacheStore<V>>>,
    /// Periodic cleanup task, if started
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<V> CacheManager<V>
where
    V: Clone + Serialize + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache instance. The sweeper is not started until
    /// [`start_sweeper`](Self::start_sweeper) is called.
    pub fn new(name: impl Into<String>, config: CacheConfig) -> Self {
        let name = name.into();
        Self {
            store: Arc::new(RwLock::new(CacheStore::new(name.clone(), config))),
            name,
            sweeper: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // == Set ==
    /// Stores `data` under `key`. See [`CacheStore::set`].
    pub async fn set(&self, key: impl Into<String>, data: V, options: SetOptions) -> Result<()> {
        self.store.write().await.set(key, data, options)
    }

    // == Get ==
    /// Reads `key`, recording a hit or miss.
    pub async fn get(&self, key: &str) -> Lookup<V> {
        // Write lock: reads update metrics and may lazily remove the entry
        self.store.write().await.get(key)
    }

    // == Has ==
    pub async fn has(&self, key: &str) -> bool {
        self.store.write().await.has(key)
    }

    // == Remove ==
    pub async fn remove(&self, key: &str) -> bool {
        self.store.write().await.remove(key)
    }

    // == Remove By Tags ==
    pub async fn remove_by_tags<S: AsRef<str>>(&self, tags: &[S]) -> usize {
        self.store.write().await.remove_by_tags(tags)
    }

    // == Clear ==
    /// Empties the cache. Returns the number of entries dropped.
    pub async fn clear(&self) -> usize {
        self.store.write().await.clear()
    }

    // == Get Or Set ==
    /// Read-through lookup.
    ///
    /// Returns the cached value when live; otherwise awaits `factory`, stores
    /// its output and returns it. A factory error is passed through and
    /// nothing is cached. Concurrent callers missing on the same key may each
    /// run their own factory; there is no request coalescing.
    pub async fn get_or_set<F, Fut, E>(
        &self,
        key: &str,
        factory: F,
        options: SetOptions,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
        E: From<CacheError>,
    {
        if let Lookup::Hit(value) = self.get(key).await {
            return Ok(value);
        }

        let value = factory().await?;
        self.set(key, value.clone(), options).await?;
        Ok(value)
    }

    // == Cleanup ==
    /// Removes expired entries now. Returns the number removed.
    pub async fn cleanup(&self) -> usize {
        self.store.write().await.cleanup()
    }

    // == Metrics / Stats ==
    pub async fn metrics(&self) -> CacheMetrics {
        self.store.read().await.metrics()
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    pub async fn config(&self) -> CacheConfig {
        self.store.read().await.config().clone()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    // == Update Config ==
    /// Live-patches the configuration.
    ///
    /// The merged config is validated before anything changes. If the
    /// cleanup interval changed and the sweeper is running, it is restarted
    /// with the new period.
    pub async fn update_config(&self, update: CacheConfigUpdate) -> Result<()> {
        let (interval_changed, interval) = {
            let mut store = self.store.write().await;
            if store.is_destroyed() {
                return Err(CacheError::Destroyed(self.name.clone()));
            }

            let mut candidate = store.config().clone();
            candidate.apply(&update);
            candidate.validate()?;

            let changed = store.update_config(&update);
            (changed, store.config().cleanup_interval)
        };

        if interval_changed {
            let mut sweeper = self.sweeper.lock().await;
            if let Some(handle) = sweeper.take() {
                handle.abort();
                *sweeper = Some(spawn_cleanup_task(
                    self.name.clone(),
                    self.store.clone(),
                    interval,
                ));
                info!("[{}] sweeper restarted with interval {:?}", self.name, interval);
            }
        }
        Ok(())
    }

    // == Sweeper ==
    /// Starts the periodic cleanup task on the current tokio runtime.
    ///
    /// Returns false without doing anything when the sweeper already runs,
    /// the instance is destroyed, its config is invalid (for example a zero
    /// cleanup interval), or no runtime is available.
    pub async fn start_sweeper(&self) -> bool {
        if Handle::try_current().is_err() {
            debug!("[{}] no tokio runtime, sweeper not started", self.name);
            return false;
        }

        let mut sweeper = self.sweeper.lock().await;
        if sweeper.is_some() {
            return false;
        }

        let interval = {
            let store = self.store.read().await;
            if store.is_destroyed() {
                return false;
            }
            if let Err(err) = store.config().validate() {
                warn!("[{}] sweeper not started: {}", self.name, err);
                return false;
            }
            store.config().cleanup_interval
        };

        *sweeper = Some(spawn_cleanup_task(self.name.clone(), self.store.clone(), interval));
        true
    }

    /// Stops the periodic cleanup task. Returns whether one was running.
    pub async fn stop_sweeper(&self) -> bool {
        match self.sweeper.lock().await.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub async fn sweeper_running(&self) -> bool {
        self.sweeper.lock().await.is_some()
    }

    // == Destroy ==
    /// Stops the sweeper and clears the store. Safe to call repeatedly.
    ///
    /// Afterwards writes fail with [`CacheError::Destroyed`] and reads miss.
    pub async fn destroy(&self) {
        self.stop_sweeper().await;
        self.store.write().await.destroy();
        debug!("[{}] destroyed", self.name);
    }
}

impl<V> Drop for CacheManager<V> {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.get_mut().take() {
            handle.abort();
        }
    }
}
