//! Latency and success statistics over an experiment's results.

use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};

use crate::types::IterationResult;

/// Aggregate view of an experiment.
///
/// Average, min and max are exact. Percentiles come from an HDR histogram
/// recorded in microseconds at 3 significant figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub count: u64,
    pub successes: u64,
    pub failures: u64,
    /// Percentage of iterations with status `success`, 0..=100.
    pub success_rate: f64,
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub p50_ms: f64,
    pub p90_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}

impl LatencySummary {
    /// Summarize `results`. Returns `None` when there is nothing to summarize.
    pub fn from_results(results: &[IterationResult]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }

        let mut histogram = Histogram::<u64>::new(3).ok()?;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut successes = 0u64;

        for r in results {
            let ms = r.duration_ms.max(0.0);
            sum += ms;
            min = min.min(ms);
            max = max.max(ms);
            if r.status.is_success() {
                successes += 1;
            }
            histogram.record((ms * 1000.0).round() as u64).ok();
        }

        let count = results.len() as u64;
        let percentile = |q: f64| histogram.value_at_percentile(q) as f64 / 1000.0;

        Some(Self {
            count,
            successes,
            failures: count - successes,
            success_rate: successes as f64 / count as f64 * 100.0,
            avg_ms: sum / count as f64,
            min_ms: min,
            max_ms: max,
            p50_ms: percentile(50.0),
            p90_ms: percentile(90.0),
            p95_ms: percentile(95.0),
            p99_ms: percentile(99.0),
        })
    }
}
