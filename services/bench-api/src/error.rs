//! API error type and its HTTP mapping.
//!
//! Every failure is answered with a JSON body of the form `{"error": "..."}`
//! which the UI shows verbatim.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use experiment::ExperimentError;
use mcp_protocol::McpError;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Validation(#[from] ExperimentError),

    #[error("{0}")]
    NotFound(String),

    /// The MCP server could not be reached or answered with an RPC error.
    #[error("{0}")]
    Upstream(String),

    /// The MCP server answered, but not with something we understand.
    #[error("Invalid response format from server")]
    InvalidUpstreamResponse { raw: Value },

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("{0}")]
    Unavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) | ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidUpstreamResponse { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<McpError> for ApiError {
    fn from(err: McpError) -> Self {
        match err {
            McpError::Rpc { message, .. } => {
                ApiError::Upstream(message.unwrap_or_else(|| "Unknown RPC error".to_string()))
            }
            McpError::InvalidToolList { raw } | McpError::MissingResult { raw } => {
                ApiError::InvalidUpstreamResponse { raw }
            }
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = match &self {
            ApiError::InvalidUpstreamResponse { raw } => json!({
                "error": self.to_string(),
                "raw": raw,
            }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ExperimentError::InvalidArguments).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::InvalidUpstreamResponse { raw: Value::Null }.status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_rpc_error_without_message() {
        let err = ApiError::from(McpError::from_rpc_value(json!({"code": 1})));
        assert_eq!(err.to_string(), "Unknown RPC error");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_transport_error_passes_message() {
        let err = ApiError::from(McpError::Transport("connection refused".into()));
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn test_missing_result_is_bad_gateway() {
        let err = ApiError::from(McpError::MissingResult {
            raw: json!({"id": 1}),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }
}
