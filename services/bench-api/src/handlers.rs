//! HTTP handlers.
//!
//! Request and response bodies use camelCase member names to match the
//! browser UI; per-iteration results keep their snake_case fields.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use experiment::{
    new_experiment_id, parse_iterations, Experiment, ExperimentRunner, ExperimentSpec,
    IterationResult, LatencySummary,
};
use mcp_protocol::{McpClient, Tool};
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use storage::ExperimentListing;
use tracing::info;

use crate::error::ApiError;
use crate::state::ServerState;

const DEFAULT_LIST_LIMIT: usize = 20;
const MAX_LIST_LIMIT: usize = 200;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsRequest {
    pub server_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub server_url: Option<String>,
    pub tool_name: Option<String>,
    /// JSON text as typed by the user, or an already-parsed object.
    pub arguments: Option<Value>,
    /// Number or numeric string.
    pub iterations: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResponse {
    pub experiment_id: String,
    pub results: Vec<IterationResult>,
    pub summary: Option<LatencySummary>,
}

#[derive(Debug, Serialize)]
pub struct ExperimentResponse {
    pub experiment: Experiment,
    pub results: Vec<IterationResult>,
    pub summary: Option<LatencySummary>,
}

#[derive(Debug, Serialize)]
pub struct ExperimentListResponse {
    pub experiments: Vec<ExperimentListing>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/tools - List the tools offered by an MCP server
pub async fn tools_handler(
    Extension(state): Extension<Arc<ServerState>>,
    payload: Result<Json<ToolsRequest>, JsonRejection>,
) -> Result<Json<ToolsResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let server_url = request
        .server_url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Server URL is required".to_string()))?;

    counter!("tool_list_requests_total").increment(1);

    let client = McpClient::new(server_url, state.request_timeout)?;
    let tools = client.list_tools().await?;

    info!(server_url = %server_url, tools = tools.len(), "Listed tools");

    Ok(Json(ToolsResponse { tools }))
}

/// POST /api/run - Run and persist an experiment
pub async fn run_handler(
    Extension(state): Extension<Arc<ServerState>>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> Result<Json<RunResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let iterations = parse_iterations(request.iterations.as_ref(), state.max_iterations)?;
    let arguments_text = arguments_text(request.arguments);
    let spec = ExperimentSpec::new(
        request.server_url.as_deref().unwrap_or_default(),
        request.tool_name.as_deref().unwrap_or_default(),
        arguments_text.as_deref(),
        iterations,
        state.max_iterations,
    )?;

    let mut experiment = Experiment::from_spec(new_experiment_id(), &spec);
    let client = McpClient::new(spec.server_url.as_str(), state.request_timeout)?;
    let results = ExperimentRunner::new(client).run(&spec).await;

    state
        .store
        .save_unique(&mut experiment, &results, new_experiment_id)
        .await?;
    counter!("experiments_stored_total").increment(1);

    info!(
        id = %experiment.id,
        tool = %experiment.tool_name,
        iterations = results.len(),
        "Experiment stored"
    );

    let summary = LatencySummary::from_results(&results);
    Ok(Json(RunResponse {
        experiment_id: experiment.id,
        results,
        summary,
    }))
}

/// GET /api/experiments/:id - Fetch a stored experiment
pub async fn get_experiment_handler(
    Extension(state): Extension<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<ExperimentResponse>, ApiError> {
    let stored = state
        .store
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Experiment not found".to_string()))?;

    let summary = LatencySummary::from_results(&stored.results);
    Ok(Json(ExperimentResponse {
        experiment: stored.experiment,
        results: stored.results,
        summary,
    }))
}

/// GET /api/experiments - Recent experiments, newest first
pub async fn list_experiments_handler(
    Extension(state): Extension<Arc<ServerState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ExperimentListResponse>, ApiError> {
    let Query(params) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    let experiments = state.store.list_recent(limit).await?;
    Ok(Json(ExperimentListResponse { experiments }))
}

/// DELETE /api/experiments/:id - Remove a stored experiment
pub async fn delete_experiment_handler(
    Extension(state): Extension<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.store.delete(&id).await? {
        info!(id = %id, "Experiment deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Experiment not found".to_string()))
    }
}

/// GET /health - Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "bench-api"
    }))
}

/// GET /metrics - Prometheus exposition
pub async fn metrics_handler(
    Extension(state): Extension<Arc<ServerState>>,
) -> Result<Response, ApiError> {
    let handle = state
        .prometheus
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("Metrics recorder not installed".to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response())
}

// ============================================================================
// Helpers
// ============================================================================

/// Normalise the `arguments` member to text.
///
/// The UI submits the textarea contents as a string; API clients may send an
/// object directly.
fn arguments_text(arguments: Option<Value>) -> Option<String> {
    match arguments {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_arguments_text_forms() {
        assert_eq!(arguments_text(None), None);
        assert_eq!(arguments_text(Some(Value::Null)), None);
        assert_eq!(
            arguments_text(Some(json!("{\"a\": 1}"))).as_deref(),
            Some("{\"a\": 1}")
        );
        assert_eq!(arguments_text(Some(json!({"a": 1}))).as_deref(), Some("{\"a\":1}"));
        assert_eq!(arguments_text(Some(json!([1]))).as_deref(), Some("[1]"));
    }

    #[test]
    fn test_run_request_accepts_string_iterations() {
        let request: RunRequest = serde_json::from_value(json!({
            "serverUrl": "http://localhost:8000/mcp",
            "toolName": "echo",
            "arguments": "{}",
            "iterations": "5"
        }))
        .unwrap();
        assert_eq!(request.iterations, Some(json!("5")));
        assert_eq!(request.tool_name.as_deref(), Some("echo"));
    }
}
