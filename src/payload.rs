//! Cached Payloads
//!
//! The closed set of result shapes stored by the named cache instances.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cached Result ==
/// A cacheable computation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum CachedResult {
    /// Tabular rows from a dataset preview or query
    Rows(RowSet),
    /// Field descriptors of a dataset
    Fields(Vec<FieldDescriptor>),
    /// Evaluated metric series
    Metric(MetricSeries),
    /// Introspected datasource schema
    Schema(Vec<TableSchema>),
    /// Any other JSON document (dataset metadata, metric lists, ...)
    Document(Value),
}

impl CachedResult {
    pub fn rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        CachedResult::Rows(RowSet { columns, rows })
    }

    pub fn document(value: Value) -> Self {
        CachedResult::Document(value)
    }

    pub fn as_rows(&self) -> Option<&RowSet> {
        match self {
            CachedResult::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Value> {
        match self {
            CachedResult::Document(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub metric_id: String,
    pub points: Vec<MetricPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<FieldDescriptor>,
}
