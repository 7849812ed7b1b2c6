//! Invalidation Events
//!
//! Domain write-events that the invalidator routes onto cache actions.
//! Every kind enum deserializes unrecognised strings to `Unknown`, which
//! triggers only the baseline invalidation for its entity.

use serde::{Deserialize, Serialize};

/// What changed on a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetUpdate {
    Fields,
    Data,
    Metadata,
    Permissions,
    #[serde(other)]
    Unknown,
}

impl DatasetUpdate {
    /// Whether previously computed query results over the dataset are stale.
    pub fn affects_queries(&self) -> bool {
        matches!(
            self,
            DatasetUpdate::Fields | DatasetUpdate::Data | DatasetUpdate::Permissions
        )
    }
}

/// What changed on a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricUpdate {
    Definition,
    Data,
    Metadata,
    #[serde(other)]
    Unknown,
}

/// What changed on a datasource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasourceUpdate {
    Config,
    Schema,
    Permissions,
    #[serde(other)]
    Unknown,
}

impl DatasourceUpdate {
    pub fn affects_queries(&self) -> bool {
        matches!(self, DatasourceUpdate::Config | DatasourceUpdate::Schema)
    }
}

/// Kind of resource a permission change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Dataset,
    Metric,
    Datasource,
    #[serde(other)]
    Unknown,
}

/// Which system setting group changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemConfig {
    Cache,
    Database,
    Security,
    Performance,
    #[serde(other)]
    Unknown,
}

// == Invalidation Event ==
/// One entry of an invalidation batch.
///
/// Serialized form: `{"entity": "dataset", "id": "d1", "update": "fields"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum InvalidationEvent {
    Dataset {
        id: String,
        update: DatasetUpdate,
    },
    Metric {
        id: String,
        update: MetricUpdate,
    },
    Datasource {
        id: String,
        update: DatasourceUpdate,
    },
    UserPermissions {
        user_id: String,
        resource_type: ResourceType,
        #[serde(default)]
        resource_id: Option<String>,
    },
    SystemConfig {
        config: SystemConfig,
    },
}
