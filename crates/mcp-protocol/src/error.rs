//! Error types for MCP client calls.

use serde_json::Value;
use thiserror::Error;

/// Result type alias using McpError.
pub type McpResult<T> = Result<T, McpError>;

/// Everything that can go wrong talking to an MCP server.
#[derive(Debug, Error)]
pub enum McpError {
    /// Connection failure, timeout, or non-2xx HTTP status.
    #[error("{0}")]
    Transport(String),

    #[error("Invalid JSON response")]
    InvalidJson,

    /// The server answered with a JSON-RPC `error` member.
    #[error("{}", rpc_error_text(.message, .raw))]
    Rpc {
        code: Option<i64>,
        message: Option<String>,
        raw: Value,
    },

    /// Envelope carried neither `result` nor `error`.
    #[error("Response contained neither result nor error")]
    MissingResult { raw: Value },

    #[error("Invalid response format from server")]
    InvalidToolList { raw: Value },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl McpError {
    /// Build an `Rpc` error from the raw `error` member of an envelope.
    ///
    /// Servers are not consistent here: most send `{code, message}` objects,
    /// some send a bare string.
    pub fn from_rpc_value(raw: Value) -> Self {
        let (code, message) = match &raw {
            Value::String(s) => (None, Some(s.clone())),
            Value::Object(obj) => (
                obj.get("code").and_then(Value::as_i64),
                obj.get("message").and_then(Value::as_str).map(str::to_string),
            ),
            _ => (None, None),
        };
        McpError::Rpc { code, message, raw }
    }

    /// Text recorded against a failed tool call.
    pub fn response_text(&self) -> String {
        match self {
            McpError::MissingResult { raw } | McpError::InvalidToolList { raw } => raw.to_string(),
            other => other.to_string(),
        }
    }
}

fn rpc_error_text(message: &Option<String>, raw: &Value) -> String {
    match message {
        Some(m) => m.clone(),
        None => raw.to_string(),
    }
}

impl From<reqwest::Error> for McpError {
    fn from(err: reqwest::Error) -> Self {
        McpError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rpc_error_from_object() {
        let err = McpError::from_rpc_value(json!({"code": -32000, "message": "This tool always fails"}));
        match &err {
            McpError::Rpc { code, message, .. } => {
                assert_eq!(*code, Some(-32000));
                assert_eq!(message.as_deref(), Some("This tool always fails"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.response_text(), "This tool always fails");
    }

    #[test]
    fn test_rpc_error_from_string() {
        let err = McpError::from_rpc_value(json!("boom"));
        assert_eq!(err.response_text(), "boom");
    }

    #[test]
    fn test_rpc_error_without_message_serializes_raw() {
        let err = McpError::from_rpc_value(json!({"code": 7}));
        let parsed: Value = serde_json::from_str(&err.response_text()).unwrap();
        assert_eq!(parsed, json!({"code": 7}));
    }

    #[test]
    fn test_missing_result_text_is_envelope() {
        let raw = json!({"jsonrpc": "2.0", "id": 1});
        let err = McpError::MissingResult { raw: raw.clone() };
        let parsed: Value = serde_json::from_str(&err.response_text()).unwrap();
        assert_eq!(parsed, raw);
    }
}
