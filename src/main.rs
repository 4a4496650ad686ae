//! Prompt Memo - response memoization for LLM API calls
//!
//! Serves a single in-process response cache over HTTP.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use serde_json::Value;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prompt_memo::api::create_router;
use prompt_memo::{spawn_cleanup_task, AppState, Config, Snapshot};

/// Main entry point for the memoization service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache and restore the snapshot file, if configured
/// 4. Start the expiry sweep, if configured
/// 5. Serve the router until SIGINT/SIGTERM
/// 6. Save the snapshot file, if configured
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prompt_memo=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Prompt Memo response cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: capacity={}, default_ttl_ms={}, port={}, cleanup_interval_ms={}, snapshot_path={:?}",
        config.capacity,
        config.default_ttl_ms,
        config.server_port,
        config.cleanup_interval_ms,
        config.snapshot_path
    );

    let state = AppState::from_config(&config);

    if let Some(path) = config.snapshot_path.as_deref() {
        restore_snapshot(&state, path).await?;
    }

    let cleanup_handle = config
        .cleanup_interval()
        .map(|interval| spawn_cleanup_task(state.cache.clone(), interval));

    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    if let Some(path) = config.snapshot_path.as_deref() {
        let snapshot = state.cache.read().await.export();
        snapshot
            .write_to(path)
            .with_context(|| format!("failed to write snapshot to {}", path.display()))?;
        info!(
            "Saved {} entries to {}",
            snapshot.entries.len(),
            path.display()
        );
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Loads the snapshot file into the cache. A missing file is a fresh start.
async fn restore_snapshot(state: &AppState, path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        info!("No snapshot at {}, starting empty", path.display());
        return Ok(());
    }

    let snapshot: Snapshot<Value> = Snapshot::read_from(path)
        .with_context(|| format!("failed to load snapshot from {}", path.display()))?;
    let report = state.cache.write().await.import(snapshot);

    if let Some(version) = report.version_mismatch {
        warn!(
            "Snapshot {} has unsupported version {}, ignored",
            path.display(),
            version
        );
    } else {
        info!(
            "Restored {} entries from {} ({} expired)",
            report.imported,
            path.display(),
            report.skipped
        );
    }
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweep.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Expiry sweep aborted");
    }
}
