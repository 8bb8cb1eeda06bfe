//! Mock MCP tool server.
//!
//! Serves a JSON-RPC endpoint at `POST /mcp` exposing three tools:
//! - `echo`: returns the `message` argument
//! - `random_number`: returns an integer between `min` and `max`
//! - `error_tool`: always fails with a JSON-RPC error
//!
//! Every `tools/call` sleeps for a random latency first so benchmark runs
//! have something to measure.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{routing::post, Json, Router};
use rand::Rng;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tracing::debug;

/// Simulated latency window for `tools/call`.
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub min_latency: Duration,
    pub max_latency: Duration,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            min_latency: Duration::from_millis(50),
            max_latency: Duration::from_millis(200),
        }
    }
}

impl MockConfig {
    fn sample_latency(&self) -> Duration {
        let (lo, hi) = if self.min_latency <= self.max_latency {
            (self.min_latency, self.max_latency)
        } else {
            (self.max_latency, self.min_latency)
        };
        if lo == hi {
            return lo;
        }
        rand::thread_rng().gen_range(lo..=hi)
    }
}

/// Build the mock router.
pub fn create_router(config: MockConfig) -> Router {
    Router::new().route(
        "/mcp",
        post(move |Json(body): Json<Value>| {
            let config = config.clone();
            async move { Json(handle_rpc(&config, body).await) }
        }),
    )
}

/// A mock server running on an ephemeral local port.
pub struct MockServer {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl MockServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Full JSON-RPC endpoint URL.
    pub fn url(&self) -> String {
        format!("http://{}/mcp", self.addr)
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start the mock server on `127.0.0.1:0`.
pub async fn spawn(config: MockConfig) -> anyhow::Result<MockServer> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = create_router(config);

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "Mock MCP server failed");
        }
    });

    Ok(MockServer { addr, task })
}

async fn handle_rpc(config: &MockConfig, body: Value) -> Value {
    let id = body.get("id").cloned().unwrap_or(Value::Null);
    let method = body.get("method").and_then(Value::as_str).unwrap_or_default();
    debug!(method = %method, "Mock MCP request");

    match method {
        "tools/list" => success(id, json!({ "tools": tool_catalog() })),
        "tools/call" => {
            let params = body.get("params").cloned().unwrap_or_else(|| json!({}));
            let name = params.get("name").and_then(Value::as_str).unwrap_or_default();
            let args = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

            tokio::time::sleep(config.sample_latency()).await;

            match name {
                "echo" => {
                    let message = args.get("message").map(display_arg).unwrap_or_default();
                    success(id, text_content(format!("Echo: {}", message)))
                }
                "random_number" => {
                    let min = int_arg(&args, "min").unwrap_or(0);
                    let max = int_arg(&args, "max").unwrap_or(100);
                    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
                    let n = rand::thread_rng().gen_range(lo..=hi);
                    success(id, text_content(n.to_string()))
                }
                "error_tool" => failure(id, -32000, "This tool always fails"),
                _ => method_not_found(id),
            }
        }
        _ => method_not_found(id),
    }
}

fn tool_catalog() -> Value {
    json!([
        {
            "name": "echo",
            "description": "Echoes back the input",
            "inputSchema": {
                "type": "object",
                "properties": { "message": { "type": "string" } }
            }
        },
        {
            "name": "random_number",
            "description": "Returns a random number",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "min": { "type": "integer" },
                    "max": { "type": "integer" }
                }
            }
        },
        {
            "name": "error_tool",
            "description": "Always returns an error",
            "inputSchema": { "type": "object", "properties": {} }
        }
    ])
}

fn text_content(text: String) -> Value {
    json!({ "content": [{ "type": "text", "text": text }] })
}

fn success(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn failure(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message }
    })
}

fn method_not_found(id: Value) -> Value {
    failure(id, -32601, "Method not found")
}

fn display_arg(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Integer arguments may arrive as numbers or numeric strings.
fn int_arg(args: &Value, key: &str) -> Option<i64> {
    match args.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
