//! Command-line benchmarking of MCP tools.
//!
//! This crate provides tools to:
//! - Describe experiments in YAML scenario files
//! - Run experiments locally with a progress bar
//! - Fetch experiments stored by `bench-api`
//! - Output results in multiple formats (console, JSON, CSV)

pub mod api_client;
pub mod config;
pub mod report;
pub mod runner;

pub use api_client::BenchApiClient;
pub use config::ScenarioConfig;
pub use report::{ExperimentReport, OutputFormat, ResultsReport};
pub use runner::{run_experiment, tools_table};
