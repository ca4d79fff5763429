//! Marine API Server
//!
//! Buoy, wave forecast and tide lookups over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use marine_api::config::{MarineConfig, DEFAULT_CONFIG_PATH};
use marine_api::router::build_router;
use marine_api::state::AppState;

/// Marine API Server
#[derive(Parser, Debug)]
#[command(name = "marine-api")]
#[command(about = "Buoy, wave forecast and tide data server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8085", env = "MARINE_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "MARINE_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, env = "MARINE_CONFIG")]
    config: String,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    info!("Starting marine API server");

    let config = MarineConfig::load(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config))?;
    let state = Arc::new(AppState::new(config).context("Failed to initialize application state")?);

    let app = build_router(state);

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
