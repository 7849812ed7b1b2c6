//! Configuration Module
//!
//! Loads per-instance cache settings and the process-wide sweep interval
//! from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::error::{CacheError, Result};

/// Process configuration for the three named caches.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Dataset metadata and result cache
    pub dataset: CacheConfig,
    /// Metric result cache
    pub metric: CacheConfig,
    /// Raw query result cache
    pub query: CacheConfig,
    /// Interval of the process-wide sweep across all caches
    pub sweep_interval: Duration,
}

const MINUTE_MS: u64 = 60 * 1000;

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// For each of `DATASET`, `METRIC` and `QUERY`:
    /// - `{NAME}_CACHE_MAX_MEMORY_MB` - Memory ceiling in MB
    /// - `{NAME}_CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds
    /// - `{NAME}_CACHE_CLEANUP_INTERVAL_MS` - Per-instance sweep period
    /// - `{NAME}_CACHE_ENABLE_METRICS` - `true`/`false`
    ///
    /// And `CACHE_SWEEP_INTERVAL_MS` for the process-wide sweep (default: 10 min).
    ///
    /// Unparsable values fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            dataset: cache_config(&lookup, "DATASET", defaults.dataset),
            metric: cache_config(&lookup, "METRIC", defaults.metric),
            query: cache_config(&lookup, "QUERY", defaults.query),
            sweep_interval: lookup("CACHE_SWEEP_INTERVAL_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.sweep_interval),
        }
    }

    /// Checks every instance config.
    pub fn validate(&self) -> Result<()> {
        self.dataset.validate()?;
        self.metric.validate()?;
        self.query.validate()?;
        if self.sweep_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "sweep interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn cache_config<F>(lookup: &F, name: &str, defaults: CacheConfig) -> CacheConfig
where
    F: Fn(&str) -> Option<String>,
{
    let var = |suffix: &str| lookup(&format!("{}_CACHE_{}", name, suffix));

    let mut config = defaults;
    if let Some(mb) = var("MAX_MEMORY_MB").and_then(|v| v.parse::<usize>().ok()) {
        config = config.with_max_memory_bytes(mb.saturating_mul(crate::cache::BYTES_PER_MB));
    }
    if let Some(ms) = var("DEFAULT_TTL_MS").and_then(|v| v.parse().ok()) {
        config = config.with_default_ttl(Duration::from_millis(ms));
    }
    if let Some(ms) = var("CLEANUP_INTERVAL_MS").and_then(|v| v.parse().ok()) {
        config = config.with_cleanup_interval(Duration::from_millis(ms));
    }
    if let Some(enabled) = var("ENABLE_METRICS").and_then(|v| v.parse().ok()) {
        config = config.with_metrics(enabled);
    }
    config
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset: CacheConfig::new(100, 30 * MINUTE_MS, 5 * MINUTE_MS),
            metric: CacheConfig::new(50, 15 * MINUTE_MS, 5 * MINUTE_MS),
            query: CacheConfig::new(200, 10 * MINUTE_MS, 5 * MINUTE_MS),
            sweep_interval: Duration::from_millis(10 * MINUTE_MS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::BYTES_PER_MB;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.dataset.max_memory_bytes, 100 * BYTES_PER_MB);
        assert_eq!(config.metric.default_ttl, Duration::from_secs(15 * 60));
        assert_eq!(config.query.max_memory_bytes, 200 * BYTES_PER_MB);
        assert_eq!(config.sweep_interval, Duration::from_secs(600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_lookup_defaults() {
        let config = Config::from_lookup(lookup_from(&[]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_from_lookup_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("QUERY_CACHE_MAX_MEMORY_MB", "8"),
            ("QUERY_CACHE_DEFAULT_TTL_MS", "1500"),
            ("METRIC_CACHE_ENABLE_METRICS", "false"),
            ("DATASET_CACHE_CLEANUP_INTERVAL_MS", "2000"),
            ("CACHE_SWEEP_INTERVAL_MS", "30000"),
        ]));

        assert_eq!(config.query.max_memory_bytes, 8 * BYTES_PER_MB);
        assert_eq!(config.query.default_ttl, Duration::from_millis(1500));
        assert!(!config.metric.enable_metrics);
        assert_eq!(config.dataset.cleanup_interval, Duration::from_secs(2));
        assert_eq!(config.sweep_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_config_unparsable_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATASET_CACHE_MAX_MEMORY_MB", "lots"),
            ("METRIC_CACHE_ENABLE_METRICS", "yes"),
        ]));

        assert_eq!(config.dataset.max_memory_bytes, 100 * BYTES_PER_MB);
        assert!(config.metric.enable_metrics);
    }

    #[test]
    fn test_config_validate_rejects_zero_memory() {
        let config = Config::from_lookup(lookup_from(&[("METRIC_CACHE_MAX_MEMORY_MB", "0")]));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_rejects_zero_sweep_interval() {
        let config = Config::from_lookup(lookup_from(&[("CACHE_SWEEP_INTERVAL_MS", "0")]));

        assert_eq!(config.sweep_interval, Duration::ZERO);
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_validate_rejects_zero_cleanup_interval() {
        let config = Config::from_lookup(lookup_from(&[("QUERY_CACHE_CLEANUP_INTERVAL_MS", "0")]));
        assert!(config.validate().is_err());
    }
}
