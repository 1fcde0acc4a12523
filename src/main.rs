//! giftscan - barcode gift idea tracker
//!
//! HTTP/SSE backend for the mobile web client: scan a product barcode,
//! resolve it, and save the result as a gift idea under a named profile.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use giftscan::config::{Config, Overrides};
use giftscan::lookup::{self, ResolverKind};
use giftscan::storage::{self, StorageKind};
use giftscan::{build_router, AppState};

/// Command-line arguments for giftscan
#[derive(Parser, Debug)]
#[command(name = "giftscan")]
#[command(about = "Barcode gift idea tracker backend")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Data folder for the database or JSON store
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Storage backend: sqlite or file
    #[arg(short, long)]
    storage: Option<StorageKind>,

    /// Product resolver: catalog or remote
    #[arg(short, long)]
    resolver: Option<ResolverKind>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting giftscan v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = Config::resolve(Overrides {
        data_dir: args.data_dir,
        port: args.port,
        storage: args.storage,
        resolver: args.resolver,
    });
    info!(
        "Configuration: storage={} resolver={} data_dir={}",
        config.storage,
        config.resolver,
        config.data_dir.display()
    );

    let backend = match storage::open(config.storage, &config.data_dir).await {
        Ok(backend) => {
            info!("✓ Opened {} storage", config.storage);
            backend
        }
        Err(e) => {
            error!("Failed to open storage: {}", e);
            return Err(e.into());
        }
    };

    let resolver = lookup::build(config.resolver);

    // No server-side image decoder is bundled; POST /api/scan/image answers
    // 503 until one is wired in here. Camera decoding happens client-side.
    let state = AppState::build(backend, resolver, None)
        .await
        .context("Failed to initialize stores")?;

    // First run starts with a couple of example profiles
    state
        .profiles
        .seed_if_empty()
        .await
        .context("Failed to seed starter profiles")?;

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
