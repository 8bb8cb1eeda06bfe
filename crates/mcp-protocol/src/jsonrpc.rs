//! JSON-RPC 2.0 envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{McpError, McpResult};

pub const JSONRPC_VERSION: &str = "2.0";

/// Outgoing JSON-RPC request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            id,
            params,
        }
    }
}

/// Incoming JSON-RPC response.
///
/// Every member is optional so that malformed replies still parse and can be
/// reported verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl JsonRpcResponse {
    /// Interpret a decoded body. A non-null `error` member takes precedence
    /// over `result`.
    ///
    /// Only the `error` and `result` members are inspected, so a reply with
    /// an odd `jsonrpc` or `id` still yields its result.
    pub fn from_value(body: Value) -> McpResult<Value> {
        if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
            return Err(McpError::from_rpc_value(error.clone()));
        }

        match body.get("result") {
            Some(result) => Ok(result.clone()),
            None => Err(McpError::MissingResult { raw: body }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_omits_absent_params() {
        let request = JsonRpcRequest::new(1, "tools/list", None);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({"jsonrpc": "2.0", "method": "tools/list", "id": 1}));
    }

    #[test]
    fn test_request_with_params() {
        let request = JsonRpcRequest::new(
            3,
            "tools/call",
            Some(json!({"name": "echo", "arguments": {"message": "hi"}})),
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["params"]["name"], "echo");
        assert_eq!(value["params"]["arguments"]["message"], "hi");
    }

    #[test]
    fn test_result_is_returned() {
        let body = json!({"jsonrpc": "2.0", "id": 1, "result": {"content": []}});
        assert_eq!(JsonRpcResponse::from_value(body).unwrap(), json!({"content": []}));
    }

    #[test]
    fn test_error_wins_over_result() {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {"content": []},
            "error": {"code": -1, "message": "nope"}
        });
        let err = JsonRpcResponse::from_value(body).unwrap_err();
        assert_eq!(err.response_text(), "nope");
    }

    #[test]
    fn test_null_error_is_ignored() {
        let body = json!({"jsonrpc": "2.0", "id": 1, "result": 5, "error": null});
        assert_eq!(JsonRpcResponse::from_value(body).unwrap(), json!(5));
    }

    #[test]
    fn test_neither_result_nor_error() {
        let body = json!({"jsonrpc": "2.0", "id": 1});
        assert!(matches!(
            JsonRpcResponse::from_value(body),
            Err(McpError::MissingResult { .. })
        ));
    }

    #[test]
    fn test_unexpected_member_types_keep_result() {
        let body = json!({"jsonrpc": 2.0, "id": {"seq": 1}, "result": {"tools": []}});
        assert_eq!(JsonRpcResponse::from_value(body).unwrap(), json!({"tools": []}));
    }

    #[test]
    fn test_string_error_with_numeric_version() {
        let body = json!({"jsonrpc": 2, "id": 1, "error": "server busy"});
        let err = JsonRpcResponse::from_value(body).unwrap_err();
        assert_eq!(err.response_text(), "server busy");
    }

    #[test]
    fn test_non_object_body() {
        let body = json!([1, 2, 3]);
        match JsonRpcResponse::from_value(body.clone()) {
            Err(McpError::MissingResult { raw }) => assert_eq!(raw, body),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
