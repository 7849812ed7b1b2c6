//! TTL Cleanup Tasks
//!
//! Background tasks that periodically remove expired cache entries, either
//! for a single store or across every named instance in a registry.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::registry::CacheRegistry;

/// Spawns a task that periodically cleans up one store's expired entries.
///
/// The task sleeps for `interval` between runs and takes the write lock
/// only for the sweep itself. The returned handle is owned by the caller
/// and aborted on shutdown.
///
/// # Example
/// ```ignore
/// let store = Arc::new(RwLock::new(CacheStore::<String>::new("query", CacheConfig::default())));
/// let handle = spawn_cleanup_task("query".to_string(), store.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task<V>(
    name: String,
    store: Arc<RwLock<CacheStore<V>>>,
    interval: Duration,
) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    tokio::spawn(async move {
        debug!("[{}] starting cleanup task with interval {:?}", name, interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.write().await.cleanup();

            if removed > 0 {
                info!("[{}] TTL cleanup: removed {} expired entries", name, removed);
            } else {
                debug!("[{}] TTL cleanup: no expired entries found", name);
            }
        }
    })
}

/// Spawns the process-wide sweep over every instance in `registry`.
///
/// Logs the aggregate number of entries removed per run.
pub fn spawn_registry_sweep(registry: Arc<CacheRegistry>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting cache sweep with interval {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = registry.cleanup_all().await;

            if removed > 0 {
                info!("Cache sweep: removed {} expired entries across all caches", removed);
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    })
}
