//! Storage for mcp-bench services.
//!
//! Experiments and their per-iteration results live in a single SQLite
//! database so that shared result links keep working across restarts.

pub mod experiments;

pub use experiments::{ExperimentListing, ExperimentStore, StoredExperiment};
