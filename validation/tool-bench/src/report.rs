//! Results reporting and formatting.

use clap::ValueEnum;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use experiment::{Experiment, IterationResult, LatencySummary};
use serde::{Deserialize, Serialize};

/// Characters of a response shown in the iteration table.
pub const RESPONSE_PREVIEW_CHARS: usize = 50;

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// An experiment with its results, shaped like the `bench-api` experiment
/// response so fetched and local runs report the same way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub experiment: Experiment,
    pub results: Vec<IterationResult>,
    #[serde(default)]
    pub summary: Option<LatencySummary>,
}

impl ExperimentReport {
    pub fn new(experiment: Experiment, results: Vec<IterationResult>) -> Self {
        let summary = LatencySummary::from_results(&results);
        Self {
            experiment,
            results,
            summary,
        }
    }
}

/// Formats experiment reports for output.
pub struct ResultsReport;

impl ResultsReport {
    pub fn format(report: &ExperimentReport, format: OutputFormat) -> anyhow::Result<String> {
        Ok(match format {
            OutputFormat::Table => Self::format_table(report),
            OutputFormat::Json => Self::format_json(report)?,
            OutputFormat::Csv => format!("{}\n{}", Self::csv_header(), Self::format_csv(report)),
        })
    }

    /// Format the summary and the per-iteration results as console tables.
    pub fn format_table(report: &ExperimentReport) -> String {
        let experiment = &report.experiment;

        let mut summary = Table::new();
        summary
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![format!("Experiment {}", experiment.id)]);

        summary.add_row(vec!["Tool:", experiment.tool_name.as_str()]);
        summary.add_row(vec!["Server:", experiment.server_url.as_str()]);
        summary.add_row(vec!["Arguments:", experiment.arguments.as_str()]);
        summary.add_row(vec!["Started:", &experiment.timestamp.to_rfc3339()]);
        summary.add_row(vec!["Iterations:", &format!("{}", report.results.len())]);

        match &report.summary {
            Some(s) => {
                summary.add_row(vec![
                    "Success Rate:",
                    &format!("{:.1}% ({}/{})", s.success_rate, s.successes, s.count),
                ]);
                summary.add_row(vec!["", ""]);
                summary.add_row(vec!["Latency (ms)", "avg / min / max"]);
                summary.add_row(vec![
                    "",
                    &format!("{:.2} / {:.2} / {:.2}", s.avg_ms, s.min_ms, s.max_ms),
                ]);
                summary.add_row(vec!["", "p50 / p90 / p95 / p99"]);
                summary.add_row(vec![
                    "",
                    &format!(
                        "{:.2} / {:.2} / {:.2} / {:.2}",
                        s.p50_ms, s.p90_ms, s.p95_ms, s.p99_ms
                    ),
                ]);
            }
            None => {
                summary.add_row(vec!["Success Rate:", "-"]);
            }
        }

        let mut iterations = Table::new();
        iterations
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec!["#", "Status", "Duration (ms)", "Response"]);

        for r in &report.results {
            iterations.add_row(vec![
                r.iteration.to_string(),
                r.status.as_str().to_string(),
                format!("{:.2}", r.duration_ms),
                truncate_response(&r.response, RESPONSE_PREVIEW_CHARS),
            ]);
        }

        format!("{}\n{}", summary, iterations)
    }

    /// Format the report as JSON.
    pub fn format_json(report: &ExperimentReport) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    /// Format iterations as CSV rows, one per line.
    pub fn format_csv(report: &ExperimentReport) -> String {
        let experiment = &report.experiment;
        report
            .results
            .iter()
            .map(|r| {
                format!(
                    "{},{},{},{},{},{:.3},{}",
                    experiment.id,
                    experiment.timestamp.to_rfc3339(),
                    csv_field(&experiment.tool_name),
                    r.iteration,
                    r.status.as_str(),
                    r.duration_ms,
                    csv_field(&r.response)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// CSV header row.
    pub fn csv_header() -> &'static str {
        "experiment_id,timestamp,tool,iteration,status,duration_ms,response"
    }
}

/// Shorten `text` to at most `max` characters, ending in `...` when cut.
pub fn truncate_response(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}...", kept)
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
