//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use experiment::DEFAULT_MAX_ITERATIONS;
use mcp_protocol::DEFAULT_TIMEOUT;
use metrics_exporter_prometheus::PrometheusHandle;
use storage::ExperimentStore;

pub struct ServerState {
    pub store: Arc<ExperimentStore>,
    /// Per-request timeout for calls to MCP servers.
    pub request_timeout: Duration,
    pub max_iterations: u32,
    /// Absent when no Prometheus recorder is installed (tests).
    pub prometheus: Option<PrometheusHandle>,
}

impl ServerState {
    pub fn new(store: Arc<ExperimentStore>) -> Self {
        Self {
            store,
            request_timeout: DEFAULT_TIMEOUT,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            prometheus: None,
        }
    }
}
