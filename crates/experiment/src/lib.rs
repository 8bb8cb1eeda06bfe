//! Benchmark experiments against MCP tools.
//!
//! An experiment invokes one tool a fixed number of times with fixed
//! arguments, one call after another, and records the wall-clock latency and
//! outcome of every call.

pub mod error;
pub mod runner;
pub mod spec;
pub mod summary;
pub mod types;

pub use error::{ExperimentError, ExperimentResult};
pub use runner::{ExperimentRunner, ToolInvoker};
pub use spec::{
    new_experiment_id, parse_arguments, parse_iterations, ExperimentSpec, DEFAULT_ITERATIONS,
    DEFAULT_MAX_ITERATIONS,
};
pub use summary::LatencySummary;
pub use types::{Experiment, IterationResult, IterationStatus};
