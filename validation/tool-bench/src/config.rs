//! Scenario loading and validation.

use std::path::Path;
use std::time::Duration;

use experiment::{ExperimentSpec, DEFAULT_ITERATIONS, DEFAULT_MAX_ITERATIONS};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An experiment described in a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub server_url: String,
    pub tool: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_timeout_secs() -> u64 {
    30
}

impl ScenarioConfig {
    /// Load a scenario from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ScenarioConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Validate scenario values.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("name must not be empty");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be > 0");
        }
        self.to_spec()?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build the experiment definition for this scenario.
    pub fn to_spec(&self) -> anyhow::Result<ExperimentSpec> {
        let arguments = Value::Object(self.arguments.clone()).to_string();
        let spec = ExperimentSpec::new(
            &self.server_url,
            &self.tool,
            Some(&arguments),
            self.iterations,
            DEFAULT_MAX_ITERATIONS,
        )?;
        Ok(spec)
    }
}
