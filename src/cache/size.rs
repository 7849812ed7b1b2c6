//! Size Estimation
//!
//! Approximates the memory footprint of a payload by its serialized length.

use serde::Serialize;
use tracing::debug;

/// Estimate used when a payload cannot be serialized.
pub const FALLBACK_ENTRY_SIZE: usize = 1024;

/// Returns the JSON-serialized byte length of `data`, or
/// [`FALLBACK_ENTRY_SIZE`] if serialization fails. Never errors.
pub fn estimate_size<V: Serialize + ?Sized>(data: &V) -> usize {
    match serde_json::to_vec(data) {
        Ok(bytes) => bytes.len(),
        Err(err) => {
            debug!("Size estimation fell back to {} bytes: {}", FALLBACK_ENTRY_SIZE, err);
            FALLBACK_ENTRY_SIZE
        }
    }
}
