//! Cache Invalidator
//!
//! Routes domain write-events onto invalidation calls against the named
//! caches. Holds no state beyond the registry handle; every call reports
//! the actions it issued and none of them can fail.
//!
//! | Event                         | Dataset           | Metric                           | Query             |
//! |-------------------------------|-------------------|----------------------------------|-------------------|
//! | dataset (any)                 | `dataset:{id}`    |                                  |                   |
//! | dataset fields/data/perms     | `dataset:{id}`    |                                  | `dataset:{id}`    |
//! | metric (any)                  |                   | `metric:{id}`, `metrics`, `list` |                   |
//! | datasource (any)              | `datasource:{id}` |                                  |                   |
//! | datasource config/schema      | `datasource:{id}` |                                  | `datasource:{id}` |
//! | user permissions, dataset     | `dataset:{id}`    |                                  | `dataset:{id}`    |
//! | user permissions, metric      |                   | `metric:{id}`                    |                   |
//! | user permissions, datasource  | `datasource:{id}` |                                  |                   |
//! | user permissions, no resource | `user:{id}`       | `user:{id}`                      | `user:{id}`       |
//! | system database               |                   |                                  | clear             |
//! | system security               | clear             | clear                            |                   |

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::invalidation::{
    AllCacheStats, DatasetUpdate, DatasourceUpdate, InvalidationEvent, InvalidationReport,
    InvalidationTarget, MetricUpdate, ResourceType, SystemConfig,
};
use crate::keys::tags;
use crate::registry::{CacheName, CacheRegistry};

// == Cache Invalidator ==
#[derive(Debug, Clone)]
pub struct CacheInvalidator {
    caches: Arc<CacheRegistry>,
}

impl CacheInvalidator {
    pub fn new(caches: Arc<CacheRegistry>) -> Self {
        Self { caches }
    }

    pub fn caches(&self) -> &Arc<CacheRegistry> {
        &self.caches
    }

    // == Dataset ==
    /// Invalidates a dataset's cached entries, and its query results when
    /// the change can alter them.
    pub async fn on_dataset_updated(
        &self,
        dataset_id: &str,
        update: DatasetUpdate,
    ) -> InvalidationReport {
        let mut report = InvalidationReport::new();
        let tag = tags::dataset(dataset_id);

        self.remove_tags(&mut report, CacheName::Dataset, vec![tag.clone()])
            .await;
        if update.affects_queries() {
            self.remove_tags(&mut report, CacheName::Query, vec![tag]).await;
        }

        info!(
            "Dataset {} updated ({:?}): removed {} cache entries",
            dataset_id,
            update,
            report.total_removed()
        );
        report
    }

    // == Metric ==
    /// Invalidates a metric's entries and every metric list/summary view.
    pub async fn on_metric_updated(&self, metric_id: &str, update: MetricUpdate) -> InvalidationReport {
        let mut report = InvalidationReport::new();

        self.remove_tags(
            &mut report,
            CacheName::Metric,
            vec![
                tags::metric(metric_id),
                tags::METRICS.to_string(),
                tags::LIST.to_string(),
            ],
        )
        .await;

        if update == MetricUpdate::Definition {
            // TODO: invalidate metrics that reference this one once metric
            // definitions expose their dependencies.
            info!(
                "Metric {} definition changed; dependent metrics are not re-validated",
                metric_id
            );
        }

        info!(
            "Metric {} updated ({:?}): removed {} cache entries",
            metric_id,
            update,
            report.total_removed()
        );
        report
    }

    // == Datasource ==
    /// Invalidates datasets backed by the datasource, and query results on
    /// schema or connection changes.
    pub async fn on_datasource_updated(
        &self,
        datasource_id: &str,
        update: DatasourceUpdate,
    ) -> InvalidationReport {
        let mut report = InvalidationReport::new();

        self.invalidate_datasource_datasets(&mut report, datasource_id)
            .await;
        if update.affects_queries() {
            self.remove_tags(
                &mut report,
                CacheName::Query,
                vec![tags::datasource(datasource_id)],
            )
            .await;
        }

        info!(
            "Datasource {} updated ({:?}): removed {} cache entries",
            datasource_id,
            update,
            report.total_removed()
        );
        report
    }

    // == User Permissions ==
    /// With a resource id, invalidates that one resource; without, flushes
    /// every entry tagged with the user across all caches.
    pub async fn on_user_permissions_updated(
        &self,
        user_id: &str,
        resource_type: ResourceType,
        resource_id: Option<&str>,
    ) -> InvalidationReport {
        let mut report = InvalidationReport::new();

        match resource_id {
            Some(id) => match resource_type {
                ResourceType::Dataset => {
                    // Same scope as a dataset permissions update
                    let tag = tags::dataset(id);
                    self.remove_tags(&mut report, CacheName::Dataset, vec![tag.clone()])
                        .await;
                    self.remove_tags(&mut report, CacheName::Query, vec![tag]).await;
                }
                ResourceType::Metric => {
                    self.remove_tags(&mut report, CacheName::Metric, vec![tags::metric(id)])
                        .await;
                }
                ResourceType::Datasource => {
                    self.invalidate_datasource_datasets(&mut report, id).await;
                }
                ResourceType::Unknown => {
                    debug!("Permission change on unknown resource type for {}", id);
                }
            },
            None => {
                let tag = tags::user(user_id);
                for cache in CacheName::ALL {
                    self.remove_tags(&mut report, cache, vec![tag.clone()]).await;
                }
            }
        }

        info!(
            "Permissions of user {} updated ({:?}): removed {} cache entries",
            user_id,
            resource_type,
            report.total_removed()
        );
        report
    }

    // == System Config ==
    /// Flushes whole caches whose contents depend on the changed settings.
    pub async fn on_system_config_updated(&self, config: SystemConfig) -> InvalidationReport {
        let mut report = InvalidationReport::new();

        match config {
            SystemConfig::Database => {
                self.clear_cache(&mut report, CacheName::Query).await;
            }
            SystemConfig::Security => {
                self.clear_cache(&mut report, CacheName::Dataset).await;
                self.clear_cache(&mut report, CacheName::Metric).await;
            }
            SystemConfig::Cache | SystemConfig::Performance | SystemConfig::Unknown => {}
        }

        info!(
            "System config updated ({:?}): removed {} cache entries",
            config,
            report.total_removed()
        );
        report
    }

    // == Batch ==
    /// Applies events in order. Not atomic: each event's actions are
    /// complete before the next starts, nothing more.
    pub async fn invalidate_batch(&self, events: &[InvalidationEvent]) -> InvalidationReport {
        let mut report = InvalidationReport::new();
        for event in events {
            report.merge(self.apply(event).await);
        }
        debug!(
            "Applied {} invalidation events, removed {} entries",
            events.len(),
            report.total_removed()
        );
        report
    }

    /// Routes a single event to its handler.
    pub async fn apply(&self, event: &InvalidationEvent) -> InvalidationReport {
        match event {
            InvalidationEvent::Dataset { id, update } => self.on_dataset_updated(id, *update).await,
            InvalidationEvent::Metric { id, update } => self.on_metric_updated(id, *update).await,
            InvalidationEvent::Datasource { id, update } => {
                self.on_datasource_updated(id, *update).await
            }
            InvalidationEvent::UserPermissions {
                user_id,
                resource_type,
                resource_id,
            } => {
                self.on_user_permissions_updated(user_id, *resource_type, resource_id.as_deref())
                    .await
            }
            InvalidationEvent::SystemConfig { config } => {
                self.on_system_config_updated(*config).await
            }
        }
    }

    // == Scheduled Cleanup ==
    /// Starts the process-wide sweep of expired entries across all caches.
    ///
    /// Meant to be called once at server startup. Returns false if a sweep
    /// is already scheduled, the interval is zero, or no tokio runtime is
    /// running.
    pub async fn schedule_cleanup(&self, interval: Duration) -> bool {
        self.caches.start_sweep(interval).await
    }

    // == Emergency Clear ==
    /// Clears every cache unconditionally. For operational incidents only.
    pub async fn emergency_clear_all(&self, reason: Option<&str>) -> InvalidationReport {
        warn!(
            "Emergency cache clear: {}",
            reason.unwrap_or("no reason given")
        );

        let mut report = InvalidationReport::new();
        for cache in CacheName::ALL {
            self.clear_cache(&mut report, cache).await;
        }
        report
    }

    // == Stats ==
    pub async fn get_all_cache_stats(&self) -> AllCacheStats {
        AllCacheStats {
            dataset: self.caches.dataset().stats().await,
            metric: self.caches.metric().stats().await,
            query: self.caches.query().stats().await,
            timestamp: Utc::now(),
        }
    }

    // == Internal Helpers ==
    /// Datasets are found through the `datasource:{id}` tag; entries
    /// written without it are not reached.
    async fn invalidate_datasource_datasets(
        &self,
        report: &mut InvalidationReport,
        datasource_id: &str,
    ) {
        self.remove_tags(
            report,
            CacheName::Dataset,
            vec![tags::datasource(datasource_id)],
        )
        .await;
    }

    async fn remove_tags(
        &self,
        report: &mut InvalidationReport,
        cache: CacheName,
        tag_list: Vec<String>,
    ) {
        let removed = self.caches.get(cache).remove_by_tags(&tag_list).await;
        debug!("[{}] removed {} entries tagged {:?}", cache, removed, tag_list);
        report.push(cache, InvalidationTarget::Tags(tag_list), removed);
    }

    async fn clear_cache(&self, report: &mut InvalidationReport, cache: CacheName) {
        let removed = self.caches.get(cache).clear().await;
        report.push(cache, InvalidationTarget::Clear, removed);
    }
}
