//! Local experiment execution.

use std::time::Duration;

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use experiment::{new_experiment_id, Experiment, ExperimentRunner, ExperimentSpec};
use indicatif::{ProgressBar, ProgressStyle};
use mcp_protocol::{McpClient, Tool};
use tracing::info;

use crate::report::ExperimentReport;

/// Run `spec` against its server, showing a progress bar on stderr.
pub async fn run_experiment(
    spec: &ExperimentSpec,
    timeout: Duration,
    show_progress: bool,
) -> anyhow::Result<ExperimentReport> {
    let client = McpClient::new(spec.server_url.as_str(), timeout)?;
    let experiment = Experiment::from_spec(new_experiment_id(), spec);

    let pb = if show_progress {
        ProgressBar::new(spec.iterations as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let runner = ExperimentRunner::new(client);
    let results = runner
        .run_with_progress(spec, |result| {
            pb.set_message(format!("{:.1} ms {}", result.duration_ms, result.status.as_str()));
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();

    info!(
        id = %experiment.id,
        tool = %experiment.tool_name,
        iterations = results.len(),
        "Experiment finished"
    );

    Ok(ExperimentReport::new(experiment, results))
}

/// Render a server's tool catalogue as a console table.
pub fn tools_table(tools: &[Tool]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Tool", "Description", "Input Schema"]);

    for tool in tools {
        table.add_row(vec![
            tool.name.clone(),
            tool.description.clone().unwrap_or_default(),
            tool.input_schema
                .as_ref()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use experiment::{IterationStatus, DEFAULT_MAX_ITERATIONS};
    use mock_mcp::MockConfig;
    use serde_json::json;

    fn fast() -> MockConfig {
        MockConfig {
            min_latency: Duration::from_millis(1),
            max_latency: Duration::from_millis(2),
        }
    }

    #[tokio::test]
    async fn test_run_experiment_against_mock() {
        let server = mock_mcp::spawn(fast()).await.unwrap();
        let spec = ExperimentSpec::new(
            &server.url(),
            "echo",
            Some(r#"{"message": "bench"}"#),
            4,
            DEFAULT_MAX_ITERATIONS,
        )
        .unwrap();

        let report = run_experiment(&spec, Duration::from_secs(5), false)
            .await
            .unwrap();

        assert_eq!(report.results.len(), 4);
        assert!(report
            .results
            .iter()
            .all(|r| r.status == IterationStatus::Success));
        assert_eq!(report.experiment.tool_name, "echo");
        assert_eq!(report.experiment.iterations, 4);
        assert_eq!(report.summary.unwrap().success_rate, 100.0);
    }

    #[tokio::test]
    async fn test_run_experiment_error_tool() {
        let server = mock_mcp::spawn(fast()).await.unwrap();
        let spec =
            ExperimentSpec::new(&server.url(), "error_tool", None, 2, DEFAULT_MAX_ITERATIONS)
                .unwrap();

        let report = run_experiment(&spec, Duration::from_secs(5), false)
            .await
            .unwrap();

        for r in &report.results {
            assert_eq!(r.status, IterationStatus::Error);
            assert_eq!(r.response, "This tool always fails");
        }
    }

    #[test]
    fn test_tools_table() {
        let tools: Vec<Tool> = serde_json::from_value(json!([
            {"name": "echo", "description": "Echoes the input", "inputSchema": {"type": "object"}},
            {"name": "bare"}
        ]))
        .unwrap();

        let table = tools_table(&tools);
        assert!(table.contains("echo"));
        assert!(table.contains("Echoes the input"));
        assert!(table.contains("bare"));
    }
}
