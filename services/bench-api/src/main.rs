//! Benchmark API server.
//!
//! Serves the experiment UI and the JSON API behind it:
//! - Tool discovery on arbitrary MCP servers
//! - Timed, sequential tool invocation experiments
//! - SQLite persistence so results can be shared by link
//! - Prometheus metrics

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use bench_api::{create_router, ServerState};
use storage::ExperimentStore;

#[derive(Parser, Debug)]
#[command(name = "bench-api")]
#[command(about = "Benchmark MCP tool servers from the browser")]
struct Args {
    /// Bind address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Listen port
    #[arg(short, long, env = "PORT", default_value = "5000")]
    port: u16,

    /// SQLite database file for experiments
    #[arg(long, env = "DATABASE_PATH", default_value = "data/experiments.db")]
    database: PathBuf,

    /// Directory holding index.html, script.js and style.css
    #[arg(long, env = "STATIC_DIR", default_value = "services/bench-api/static")]
    static_dir: PathBuf,

    /// Timeout for each request to an MCP server
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    request_timeout_secs: u64,

    /// Largest iteration count a single experiment may request
    #[arg(long, env = "MAX_ITERATIONS", default_value = "1000")]
    max_iterations: u32,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!("Starting benchmark API server");

    let store = Arc::new(ExperimentStore::open(&args.database).await?);

    let state = Arc::new(ServerState {
        store,
        request_timeout: Duration::from_secs(args.request_timeout_secs),
        max_iterations: args.max_iterations.max(1),
        prometheus: Some(prometheus_handle),
    });

    let static_dir = if args.static_dir.is_dir() {
        Some(args.static_dir.as_path())
    } else {
        warn!(path = %args.static_dir.display(), "Static directory not found, UI disabled");
        None
    };

    let app = create_router(state, static_dir);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", args.host, args.port))?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Received shutdown signal");
        })
        .await?;

    Ok(())
}
