//! Dashboard Cache - process host
//!
//! Builds the named caches from the environment, runs their background
//! sweeps, and tears everything down on shutdown.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dashboard_cache::{CacheInvalidator, CacheRegistry, Config};

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Create the three named caches
/// 4. Start per-instance sweepers and the process-wide sweep
/// 5. Wait for SIGINT/SIGTERM, then stop sweeps and destroy the caches
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dashboard_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting dashboard cache");

    let config = Config::from_env();
    config.validate().context("invalid cache configuration")?;
    info!(
        "Configuration loaded: dataset={}B, metric={}B, query={}B, sweep_interval={:?}",
        config.dataset.max_memory_bytes,
        config.metric.max_memory_bytes,
        config.query.max_memory_bytes,
        config.sweep_interval
    );

    let registry = Arc::new(CacheRegistry::new(&config));
    let invalidator = CacheInvalidator::new(registry.clone());

    let started = registry.start_sweepers().await;
    info!("Started {} per-cache sweepers", started);

    if !invalidator.schedule_cleanup(config.sweep_interval).await {
        warn!("Process-wide cache sweep was not scheduled");
    }

    shutdown_signal().await?;

    let stats = invalidator.get_all_cache_stats().await;
    info!(
        "Final hit rates: dataset={:.1}%, metric={:.1}%, query={:.1}%",
        stats.dataset.hit_rate, stats.metric.hit_rate, stats.query.hit_rate
    );

    registry.shutdown().await;
    info!("Shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() -> anyhow::Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<(), anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<anyhow::Result<()>>();

    tokio::select! {
        result = ctrl_c => {
            result?;
            info!("Received Ctrl+C, initiating shutdown...");
        }
        result = terminate => {
            result?;
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
    Ok(())
}
