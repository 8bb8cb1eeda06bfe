//! MCP (Model Context Protocol) client plumbing.
//!
//! Supports:
//! - JSON-RPC 2.0 request/response envelopes
//! - `tools/list` and `tools/call` over plain HTTP POST

pub mod client;
pub mod error;
pub mod jsonrpc;
pub mod tool;

pub use client::{McpClient, DEFAULT_TIMEOUT};
pub use error::{McpError, McpResult};
pub use jsonrpc::{JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION};
pub use tool::Tool;
