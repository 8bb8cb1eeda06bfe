//! HTTP client for MCP servers speaking JSON-RPC over plain POST.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::{json, Value};
use tracing::debug;

use crate::error::{McpError, McpResult};
use crate::jsonrpc::{JsonRpcRequest, JsonRpcResponse};
use crate::tool::Tool;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client bound to a single MCP endpoint URL.
pub struct McpClient {
    http: reqwest::Client,
    endpoint: String,
    request_id: AtomicU64,
}

impl McpClient {
    /// Create a client for `endpoint`, the full URL JSON-RPC messages are posted to.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> McpResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| McpError::Client(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            request_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Send one JSON-RPC request and return its `result` member.
    pub async fn request(&self, method: &str, params: Option<Value>) -> McpResult<Value> {
        let request = JsonRpcRequest::new(self.next_id(), method, params);
        debug!(endpoint = %self.endpoint, method = %method, id = request.id, "Sending JSON-RPC request");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body = response
            .bytes()
            .await
            .map_err(|e| McpError::Transport(e.to_string()))?;
        let body: Value = serde_json::from_slice(&body).map_err(|_| McpError::InvalidJson)?;

        JsonRpcResponse::from_value(body)
    }

    /// `tools/list`
    pub async fn list_tools(&self) -> McpResult<Vec<Tool>> {
        let result = self.request("tools/list", None).await?;
        Tool::list_from_result(result)
    }

    /// `tools/call`
    pub async fn call_tool(&self, name: &str, arguments: &Value) -> McpResult<Value> {
        self.request(
            "tools/call",
            Some(json!({
                "name": name,
                "arguments": arguments,
            })),
        )
        .await
    }
}
