//! # longcall Server
//!
//! Serves the submit and poll endpoints for the demo long-running operation.
//!
//! ## Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin longcall-server
//!
//! # Run with the production overlay and a shared cache
//! LONGCALL_ENV=production LONGCALL__DATABASE__URL=postgresql://localhost/longcall \
//!     cargo run --bin longcall-server
//! ```

use anyhow::Context;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};

use longcall::cache::ResponseCache;
use longcall::config::{ConfigManager, LongCallConfig};
use longcall::logging;
use longcall::web::{self, AppState};

fn main() -> anyhow::Result<()> {
    logging::init_tracing();

    let manager = ConfigManager::load().context("Failed to load configuration")?;
    let config = manager.config().clone();
    let build_mode = if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = manager.environment(),
        build_mode = build_mode,
        "Starting longcall server"
    );

    // Blocking work units each hold a thread for their full duration
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .max_blocking_threads(config.worker.max_blocking_threads)
        .thread_name("longcall-worker")
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(serve(config))
}

async fn serve(config: LongCallConfig) -> anyhow::Result<()> {
    let state = AppState::bootstrap(&config)
        .await
        .context("Failed to initialize result cache")?;
    let cache_provider = state.engine.cache().provider_name();
    let app = web::create_app(state);

    let address: SocketAddr = config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind_address))?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    info!(
        address = %address,
        cache = cache_provider,
        default_timeout_seconds = config.engine.default_timeout_seconds,
        "longcall server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("longcall server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }
}
