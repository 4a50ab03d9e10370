//! Pending Cache - A location-aware cache for nearby pending ride requests
//!
//! Runs the fetch-through HTTP service in front of the upstream
//! pending-requests API.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pending_cache::api::{create_router, AppState};
use pending_cache::config::Config;
use pending_cache::geo::cell_size_m;
use pending_cache::service::HttpRequestSource;
use pending_cache::tasks::{start_configured_sweep, SweepHandle};

/// Main entry point for the pending-requests cache service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the upstream client and the cache-backed service
/// 4. Start the background expiry sweep, if enabled
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pending_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pending Cache service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: ttl={}ms, invalidation_distance={}m, key_precision={} (~{:.1}m cells), sweep_interval={:?}ms, upstream={}, port={}",
        config.cache.ttl_ms,
        config.cache.invalidation_distance_m,
        config.cache.key_precision,
        cell_size_m(config.cache.key_precision),
        config.cache.sweep_interval_ms,
        config.upstream_url,
        config.server_port
    );

    let source = HttpRequestSource::new(config.upstream_url.clone())
        .context("failed to build upstream HTTP client")?;
    let state = AppState::from_config(&config, source);
    info!("Location cache initialized");

    let sweep = start_configured_sweep(state.nearby.cache()).await;
    match &sweep {
        Some(_) => info!("Background expiry sweep started"),
        None => warn!("Background expiry sweep disabled; expired entries are only dropped on read"),
    }

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, stops the sweep task and allows graceful shutdown.
async fn shutdown_signal(sweep: Option<SweepHandle>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
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

    if let Some(sweep) = sweep {
        sweep.stop();
    }
}
