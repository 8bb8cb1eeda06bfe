//! Canned JSON-RPC replies for MCP client and classification tests.

use serde_json::{json, Value};

/// Endpoint used where a syntactically valid MCP URL is needed but never dialled.
pub const EXAMPLE_ENDPOINT: &str = "http://localhost:8000/mcp";

/// A `tools/list` reply with two tools.
pub fn tools_list_reply(id: u64) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": {
            "tools": [
                {
                    "name": "echo",
                    "description": "Echoes back the input",
                    "inputSchema": {
                        "type": "object",
                        "properties": { "message": { "type": "string" } }
                    }
                },
                {
                    "name": "error_tool",
                    "description": "Always returns an error",
                    "inputSchema": { "type": "object", "properties": {} }
                }
            ]
        }
    })
}

/// A successful `tools/call` reply carrying one text block.
pub fn text_result_reply(id: u64, text: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": { "content": [{ "type": "text", "text": text }] }
    })
}

/// A JSON-RPC error reply.
pub fn error_reply(id: u64, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message }
    })
}

/// A reply with neither `result` nor `error`.
pub fn empty_reply(id: u64) -> Value {
    json!({ "jsonrpc": "2.0", "id": id })
}
