//! Error types for the caching layer
//!
//! Provides unified error handling using thiserror. Cache misses are not
//! errors; see [`crate::cache::Lookup`].

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the caching layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key is empty or otherwise unusable
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Operation attempted on a destroyed cache instance
    #[error("Cache destroyed: {0}")]
    Destroyed(String),
}

// == Result Type Alias ==
/// Convenience Result type for the caching layer.
pub type Result<T> = std::result::Result<T, CacheError>;
