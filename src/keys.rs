//! Cache Key Builder
//!
//! Deterministic key and tag construction shared by the code that fills the
//! caches and the code that invalidates them.
//!
//! Keys follow `{domain}:{id}[:{subkind}[:{param}]]`. Identifier segments
//! have `%` and `:` percent-escaped, so an id containing the separator can
//! never produce another key's string.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde_json::Value;

// == Dataset Keys ==
pub fn dataset(id: &str) -> String {
    format!("dataset:{}", escape(id))
}

pub fn dataset_fields(id: &str) -> String {
    format!("dataset:{}:fields", escape(id))
}

pub fn dataset_query(id: &str, query_hash: &str) -> String {
    format!("dataset:{}:query:{}", escape(id), escape(query_hash))
}

pub fn dataset_preview(id: &str, limit: usize) -> String {
    format!("dataset:{}:preview:{}", escape(id), limit)
}

// == Metric Keys ==
/// Key for a user's metric listing under the given filter parameters.
pub fn metrics(user_id: &str, params: &Value) -> String {
    format!("metrics:{}:{}", escape(user_id), params_hash(params))
}

pub fn metric_data(id: &str, params: &Value) -> String {
    format!("metric:{}:data:{}", escape(id), params_hash(params))
}

// == Datasource Keys ==
pub fn datasource(id: &str) -> String {
    format!("datasource:{}", escape(id))
}

pub fn datasource_schema(id: &str) -> String {
    format!("datasource:{}:schema", escape(id))
}

// == Params Hash ==
/// Fixed-width hex digest of a JSON parameter object.
///
/// Object keys are serialized in sorted order, so logically equal params
/// hash identically regardless of construction order.
pub fn params_hash(params: &Value) -> String {
    let mut hasher = DefaultHasher::new();
    params.to_string().hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

fn escape(segment: &str) -> String {
    segment.replace('%', "%25").replace(':', "%3A")
}

/// Invalidation tags. Entries must be tagged at write time with every tag a
/// later invalidation may target.
pub mod tags {
    use super::escape;

    /// Shared tag for metric summary views.
    pub const METRICS: &str = "metrics";
    /// Shared tag for list views.
    pub const LIST: &str = "list";

    pub fn dataset(id: &str) -> String {
        format!("dataset:{}", escape(id))
    }

    pub fn metric(id: &str) -> String {
        format!("metric:{}", escape(id))
    }

    pub fn datasource(id: &str) -> String {
        format!("datasource:{}", escape(id))
    }

    pub fn user(id: &str) -> String {
        format!("user:{}", escape(id))
    }

    /// Both tags a dataset-derived entry needs: its dataset and the
    /// datasource backing it.
    pub fn for_dataset(dataset_id: &str, datasource_id: &str) -> Vec<String> {
        vec![dataset(dataset_id), datasource(datasource_id)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dataset_keys() {
        assert_eq!(dataset("d1"), "dataset:d1");
        assert_eq!(dataset_fields("d1"), "dataset:d1:fields");
        assert_eq!(dataset_query("d1", "abc"), "dataset:d1:query:abc");
        assert_eq!(dataset_preview("d1", 100), "dataset:d1:preview:100");
    }

    #[test]
    fn test_datasource_keys() {
        assert_eq!(datasource("s1"), "datasource:s1");
        assert_eq!(datasource_schema("s1"), "datasource:s1:schema");
    }

    #[test]
    fn test_params_hash_is_order_independent() {
        let a = json!({"from": "2024-01-01", "to": "2024-02-01"});
        let b = json!({"to": "2024-02-01", "from": "2024-01-01"});

        assert_eq!(params_hash(&a), params_hash(&b));
        assert_eq!(metrics("u1", &a), metrics("u1", &b));
        assert_eq!(params_hash(&a).len(), 16);
    }

    #[test]
    fn test_different_params_differ() {
        let a = json!({"limit": 10});
        let b = json!({"limit": 20});

        assert_ne!(metric_data("m1", &a), metric_data("m1", &b));
        assert_ne!(metrics("u1", &a), metrics("u2", &a));
    }

    #[test]
    fn test_separator_in_id_cannot_collide() {
        assert_ne!(dataset("1:fields"), dataset_fields("1"));
        assert_eq!(dataset("1:fields"), "dataset:1%3Afields");
        assert_ne!(dataset("a%3Ab"), dataset("a:b"));
    }

    #[test]
    fn test_tags() {
        assert_eq!(tags::dataset("d1"), "dataset:d1");
        assert_eq!(tags::metric("m1"), "metric:m1");
        assert_eq!(tags::user("u1"), "user:u1");
        assert_eq!(
            tags::for_dataset("d1", "s1"),
            vec!["dataset:d1".to_string(), "datasource:s1".to_string()]
        );
    }
}
