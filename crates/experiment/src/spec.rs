//! Validated experiment parameters.

use serde_json::{Map, Value};

use crate::error::{ExperimentError, ExperimentResult};

/// Iteration count used when a request does not specify one.
pub const DEFAULT_ITERATIONS: u32 = 10;

/// Upper bound on iterations unless the deployment configures another.
pub const DEFAULT_MAX_ITERATIONS: u32 = 1000;

/// Everything needed to run an experiment, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentSpec {
    pub server_url: String,
    pub tool_name: String,
    /// Parsed arguments sent with every `tools/call`. Always a JSON object.
    pub arguments: Value,
    /// Arguments text as submitted, kept for display and persistence.
    pub arguments_text: String,
    pub iterations: u32,
}

impl ExperimentSpec {
    pub fn new(
        server_url: &str,
        tool_name: &str,
        arguments_text: Option<&str>,
        iterations: u32,
        max_iterations: u32,
    ) -> ExperimentResult<Self> {
        let server_url = server_url.trim();
        if server_url.is_empty() {
            return Err(ExperimentError::MissingServerUrl);
        }
        let lower = server_url.to_ascii_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(ExperimentError::InvalidServerUrl);
        }

        let tool_name = tool_name.trim();
        if tool_name.is_empty() {
            return Err(ExperimentError::MissingToolName);
        }

        if iterations == 0 || iterations > max_iterations {
            return Err(ExperimentError::InvalidIterations {
                max: max_iterations,
            });
        }

        let arguments = parse_arguments(arguments_text)?;
        let arguments_text = match arguments_text {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => "{}".to_string(),
        };

        Ok(Self {
            server_url: server_url.to_string(),
            tool_name: tool_name.to_string(),
            arguments,
            arguments_text,
            iterations,
        })
    }
}

/// Parse tool arguments. Missing or blank text means no arguments.
pub fn parse_arguments(text: Option<&str>) -> ExperimentResult<Value> {
    let text = match text.map(str::trim) {
        None | Some("") => return Ok(Value::Object(Map::new())),
        Some(text) => text,
    };

    match serde_json::from_str::<Value>(text) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err(ExperimentError::ArgumentsNotObject),
        Err(_) => Err(ExperimentError::InvalidArguments),
    }
}

/// Parse an iteration count given as a JSON number or numeric string.
///
/// HTML number inputs submit strings, so both forms are accepted.
pub fn parse_iterations(value: Option<&Value>, max_iterations: u32) -> ExperimentResult<u32> {
    let invalid = ExperimentError::InvalidIterations {
        max: max_iterations,
    };

    let n: u64 = match value {
        None | Some(Value::Null) => return Ok(DEFAULT_ITERATIONS.min(max_iterations)),
        Some(Value::Number(n)) => n.as_u64().ok_or(invalid.clone())?,
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Ok(DEFAULT_ITERATIONS.min(max_iterations))
        }
        Some(Value::String(s)) => s.trim().parse().map_err(|_| invalid.clone())?,
        Some(_) => return Err(invalid),
    };

    if n == 0 || n > u64::from(max_iterations) {
        return Err(invalid);
    }
    Ok(n as u32)
}

/// Short random experiment identifier (first 8 hex digits of a UUID v4).
pub fn new_experiment_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}
