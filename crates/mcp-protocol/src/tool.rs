//! Tool descriptors returned by `tools/list`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{McpError, McpResult};

/// A tool advertised by an MCP server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        rename = "inputSchema",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub input_schema: Option<Value>,
    /// Members this client does not model, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Tool {
    /// Extract the `tools` array from a `tools/list` result.
    pub fn list_from_result(result: Value) -> McpResult<Vec<Tool>> {
        let tools = match result.get("tools") {
            Some(tools @ Value::Array(_)) => tools.clone(),
            _ => return Err(McpError::InvalidToolList { raw: result }),
        };

        serde_json::from_value(tools).map_err(|_| McpError::InvalidToolList { raw: result })
    }
}
