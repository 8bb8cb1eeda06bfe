//! Mock MCP tool server for local benchmarking.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use mock_mcp::{create_router, MockConfig};

#[derive(Parser, Debug)]
#[command(name = "mock-mcp")]
#[command(about = "Mock MCP tool server with simulated latency")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "MOCK_MCP_PORT", default_value = "8000")]
    port: u16,

    /// Minimum simulated latency for tools/call
    #[arg(long, default_value = "50")]
    min_latency_ms: u64,

    /// Maximum simulated latency for tools/call
    #[arg(long, default_value = "200")]
    max_latency_ms: u64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = MockConfig {
        min_latency: Duration::from_millis(args.min_latency_ms),
        max_latency: Duration::from_millis(args.max_latency_ms),
    };

    let app = create_router(config).layer(TraceLayer::new_for_http());
    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    info!(address = %addr, endpoint = "/mcp", "Starting mock MCP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
