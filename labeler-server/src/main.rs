//! labeler-server - REST API for the image labeling tool
//!
//! Serves the image catalog from a data directory and stores absolute
//! labels and pairwise comparisons in a SQLite database under the root
//! folder.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use labeler_common::config::{database_path, resolve_root_folder, ROOT_FOLDER_ENV};
use labeler_common::db::init_database;
use labeler_server::{build_router, net, AppState};
use tokio::signal;
use tracing::{info, warn};

/// Command-line arguments for labeler-server
#[derive(Parser, Debug)]
#[command(name = "labeler-server")]
#[command(about = "Image labeling REST API")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5001", env = "LABELER_PORT")]
    port: u16,

    /// Address to bind (0.0.0.0 shares the tool on the local network)
    #[arg(long, default_value = "0.0.0.0", env = "LABELER_HOST")]
    host: IpAddr,

    /// Directory containing the images to label
    #[arg(short, long, default_value = "./data", env = "LABELER_DATA_DIR")]
    data_dir: PathBuf,

    /// Root folder holding labels.db (overrides env and config file)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "labeler_server=info,tower_http=info".into()),
        )
        .init();

    // Build identification first, before any database delay
    info!(
        "Starting labeler-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), ROOT_FOLDER_ENV);
    let db_path = database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("✓ Database ready");

    if !args.data_dir.is_dir() {
        warn!(
            "Data directory {} not found; the catalog will be empty",
            args.data_dir.display()
        );
    }
    info!("Data directory: {}", args.data_dir.display());

    let state = AppState::new(pool, args.data_dir.clone());
    let app = build_router(state);

    let addr = SocketAddr::new(args.host, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("labeler-server listening on http://{}", addr);
    if args.host.is_unspecified() {
        match net::local_ip() {
            Some(ip) => info!("Share this URL with your team: {}", net::share_url(ip, args.port)),
            None => warn!("Unable to determine local IP address"),
        }
    }

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
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
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
