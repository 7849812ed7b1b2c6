//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the process is up.
//!
//! # Tasks
//! - Per-instance cleanup: removes one store's expired entries
//! - Registry sweep: removes expired entries across every named cache

mod cleanup;

pub use cleanup::{spawn_cleanup_task, spawn_registry_sweep};
