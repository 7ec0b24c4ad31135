//! Cricket Feed - local data service for the fantasy-cricket client
//!
//! Serves cached match data, cache statistics and live notification feeds.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cricket_feed::api::create_router;
use cricket_feed::{
    AppState, CleanupTask, Config, FeedEvictionTask, HttpMatchSource, MemoryNotificationStore,
    RefreshTask,
};

/// Main entry point for the feed service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the shared cache, match source and notification store
/// 4. Start the cache sweep, the live-match refresh timer and idle feed eviction
/// 5. Serve HTTP until SIGINT/SIGTERM
/// 6. Stop background tasks and unmount feeds
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cricket_feed=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cricket Feed service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, cleanup_interval={}s, refresh_interval={}s, live_ttl={}s, player_ttl={}s",
        config.server_port,
        config.cleanup_interval,
        config.refresh_interval,
        config.live_match_ttl,
        config.player_ttl
    );

    let source = HttpMatchSource::from_config(&config).context("building match source client")?;
    let store = Arc::new(MemoryNotificationStore::new());
    let state = AppState::from_config(&config, Arc::new(source), store);

    let cleanup = CleanupTask::start(state.cache.clone(), config.cleanup_period());
    let refresh = config
        .refresh_period()
        .map(|period| RefreshTask::start(state.data.clone(), period));
    if refresh.is_none() {
        info!("Live match refresh disabled");
    }
    // Idle feeds are checked at a tenth of the timeout, at least once a minute
    let eviction = config.feed_idle_period().map(|max_idle| {
        let interval = (max_idle / 10).clamp(Duration::from_secs(1), Duration::from_secs(60));
        FeedEvictionTask::start(state.feeds.clone(), interval, max_idle)
    });

    let feeds = state.feeds.clone();
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    cleanup.stop().await;
    if let Some(refresh) = refresh {
        refresh.stop().await;
    }
    if let Some(eviction) = eviction {
        eviction.stop().await;
    }
    feeds.shutdown().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
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
}
