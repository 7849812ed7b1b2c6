//! Invalidation Reports
//!
//! The record of cache actions an invalidation call performed, plus the
//! cross-cache statistics snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::CacheStats;
use crate::registry::CacheName;

/// What an action removed from a cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum InvalidationTarget {
    /// Entries carrying any of these tags
    Tags(Vec<String>),
    /// Every entry
    Clear,
}

/// One cache call issued by the invalidator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidationAction {
    pub cache: CacheName,
    pub target: InvalidationTarget,
    /// Entries removed by this action
    pub removed: usize,
}

// == Invalidation Report ==
/// Ordered list of actions taken for one event or batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InvalidationReport {
    pub actions: Vec<InvalidationAction>,
}

impl InvalidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cache: CacheName, target: InvalidationTarget, removed: usize) {
        self.actions.push(InvalidationAction {
            cache,
            target,
            removed,
        });
    }

    /// Appends another report's actions after this one's.
    pub fn merge(&mut self, other: InvalidationReport) {
        self.actions.extend(other.actions);
    }

    pub fn total_removed(&self) -> usize {
        self.actions.iter().map(|a| a.removed).sum()
    }

    /// Whether any action was issued against `cache`.
    pub fn touched(&self, cache: CacheName) -> bool {
        self.actions.iter().any(|a| a.cache == cache)
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

// == All Cache Stats ==
/// Stats of every named cache at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllCacheStats {
    pub dataset: CacheStats,
    pub metric: CacheStats,
    pub query: CacheStats,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_totals() {
        let mut report = InvalidationReport::new();
        assert!(report.is_empty());

        report.push(CacheName::Dataset, InvalidationTarget::Tags(vec!["dataset:1".to_string()]), 2);
        let mut other = InvalidationReport::new();
        other.push(CacheName::Query, InvalidationTarget::Clear, 5);
        report.merge(other);

        assert_eq!(report.total_removed(), 7);
        assert!(report.touched(CacheName::Query));
        assert!(!report.touched(CacheName::Metric));
        assert_eq!(report.actions[1].target, InvalidationTarget::Clear);
    }

    #[test]
    fn test_action_serialize() {
        let action = InvalidationAction {
            cache: CacheName::Metric,
            target: InvalidationTarget::Tags(vec!["metrics".to_string()]),
            removed: 1,
        };
        let json = serde_json::to_value(&action).unwrap();

        assert_eq!(json["cache"], "metric");
        assert_eq!(json["target"]["type"], "tags");
        assert_eq!(json["target"]["value"][0], "metrics");
    }
}
