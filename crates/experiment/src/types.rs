//! Experiment records and per-iteration results.

use std::time::Duration;

use chrono::{DateTime, Utc};
use mcp_protocol::{McpError, McpResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::spec::ExperimentSpec;

/// Outcome class of a single tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IterationStatus {
    Success,
    Error,
    /// The server replied with an envelope holding neither result nor error.
    Unknown,
}

impl IterationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }

    /// Read a stored status. Unrecognised text is `Unknown`.
    pub fn from_stored(s: &str) -> Self {
        match s {
            "success" => Self::Success,
            "error" => Self::Error,
            _ => Self::Unknown,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// One timed tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationResult {
    /// 1-based position within the experiment.
    pub iteration: u32,
    pub duration_ms: f64,
    pub status: IterationStatus,
    pub response: String,
}

impl IterationResult {
    /// Classify the outcome of a `tools/call`.
    pub fn from_outcome(iteration: u32, elapsed: Duration, outcome: McpResult<Value>) -> Self {
        let (status, response) = match outcome {
            Ok(result) => (IterationStatus::Success, result.to_string()),
            Err(err @ McpError::MissingResult { .. }) => {
                (IterationStatus::Unknown, err.response_text())
            }
            Err(err) => (IterationStatus::Error, err.response_text()),
        };

        Self {
            iteration,
            duration_ms: elapsed.as_secs_f64() * 1000.0,
            status,
            response,
        }
    }
}

/// Experiment metadata as persisted and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experiment {
    pub id: String,
    pub server_url: String,
    pub tool_name: String,
    /// Arguments exactly as submitted.
    pub arguments: String,
    pub iterations: u32,
    pub timestamp: DateTime<Utc>,
}

impl Experiment {
    pub fn from_spec(id: impl Into<String>, spec: &ExperimentSpec) -> Self {
        Self {
            id: id.into(),
            server_url: spec.server_url.clone(),
            tool_name: spec.tool_name.clone(),
            arguments: spec.arguments_text.clone(),
            iterations: spec.iterations,
            timestamp: Utc::now(),
        }
    }
}
