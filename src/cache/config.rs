//! Cache Configuration Module
//!
//! Per-instance settings for a cache store and the partial patch applied by
//! live configuration updates.

use std::time::Duration;

use serde::Serialize;

use crate::error::{CacheError, Result};

/// Bytes in one megabyte, the unit memory ceilings are configured in.
pub const BYTES_PER_MB: usize = 1024 * 1024;

// == Cache Config ==
/// Settings for a single cache instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheConfig {
    /// Memory ceiling in bytes (soft: a single oversized entry may exceed it)
    pub max_memory_bytes: usize,
    /// TTL applied when a caller does not supply one
    pub default_ttl: Duration,
    /// Period of the background sweep
    pub cleanup_interval: Duration,
    /// Whether hit/miss/eviction counters are maintained
    pub enable_metrics: bool,
}

impl CacheConfig {
    /// Creates a config from the conventional units: megabytes and milliseconds.
    pub fn new(max_memory_mb: usize, default_ttl_ms: u64, cleanup_interval_ms: u64) -> Self {
        Self {
            max_memory_bytes: max_memory_mb.saturating_mul(BYTES_PER_MB),
            default_ttl: Duration::from_millis(default_ttl_ms),
            cleanup_interval: Duration::from_millis(cleanup_interval_ms),
            enable_metrics: true,
        }
    }

    /// Overrides the memory ceiling with an exact byte count.
    pub fn with_max_memory_bytes(mut self, bytes: usize) -> Self {
        self.max_memory_bytes = bytes;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.enable_metrics = enabled;
        self
    }

    // == Validate ==
    /// Rejects settings the store cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.max_memory_bytes == 0 {
            return Err(CacheError::InvalidConfig(
                "max memory size must be greater than zero".to_string(),
            ));
        }
        if self.cleanup_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "cleanup interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    // == Apply Update ==
    /// Applies a partial update and reports whether the cleanup interval changed.
    pub fn apply(&mut self, update: &CacheConfigUpdate) -> bool {
        if let Some(bytes) = update.max_memory_bytes {
            self.max_memory_bytes = bytes;
        }
        if let Some(ttl) = update.default_ttl {
            self.default_ttl = ttl;
        }
        if let Some(enabled) = update.enable_metrics {
            self.enable_metrics = enabled;
        }
        match update.cleanup_interval {
            Some(interval) if interval != self.cleanup_interval => {
                self.cleanup_interval = interval;
                true
            }
            _ => false,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(100, 30 * 60 * 1000, 5 * 60 * 1000)
    }
}

// == Cache Config Update ==
/// Partial configuration patch; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheConfigUpdate {
    pub max_memory_bytes: Option<usize>,
    pub default_ttl: Option<Duration>,
    pub cleanup_interval: Option<Duration>,
    pub enable_metrics: Option<bool>,
}

impl CacheConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_memory_mb(mut self, mb: usize) -> Self {
        self.max_memory_bytes = Some(mb.saturating_mul(BYTES_PER_MB));
        self
    }

    pub fn with_max_memory_bytes(mut self, bytes: usize) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = Some(interval);
        self
    }

    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.enable_metrics = Some(enabled);
        self
    }
}
