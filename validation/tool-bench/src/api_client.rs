//! Client for experiments stored by `bench-api`.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::StatusCode;
use serde_json::Value;

use crate::report::ExperimentReport;

pub struct BenchApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl BenchApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch a stored experiment with its results.
    pub async fn fetch_experiment(&self, id: &str) -> Result<ExperimentReport> {
        let url = format!("{}/api/experiments/{}", self.base_url, id);
        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(anyhow!("Experiment not found: {}", id));
        }
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("request failed");
            return Err(anyhow!("bench-api returned {}: {}", status, message));
        }

        let mut report: ExperimentReport = response
            .json()
            .await
            .context("Invalid experiment response")?;
        if report.summary.is_none() {
            report = ExperimentReport::new(report.experiment, report.results);
        }
        Ok(report)
    }
}
