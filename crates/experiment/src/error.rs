//! Validation errors for experiment requests.

use thiserror::Error;

pub type ExperimentResult<T> = Result<T, ExperimentError>;

/// Reasons an experiment request is rejected before any tool is called.
///
/// The display text is user-facing and goes straight into API responses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExperimentError {
    #[error("Server URL is required")]
    MissingServerUrl,

    #[error("Server URL must be an http:// or https:// URL")]
    InvalidServerUrl,

    #[error("Tool name is required")]
    MissingToolName,

    #[error("Invalid JSON arguments")]
    InvalidArguments,

    #[error("Tool arguments must be a JSON object")]
    ArgumentsNotObject,

    #[error("Iterations must be an integer between 1 and {max}")]
    InvalidIterations { max: u32 },
}
