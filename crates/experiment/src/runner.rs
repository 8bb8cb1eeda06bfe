//! Sequential experiment execution.

use std::time::Instant;

use async_trait::async_trait;
use mcp_protocol::{McpClient, McpResult};
use metrics::{counter, histogram};
use serde_json::Value;
use tracing::{debug, info};

use crate::spec::ExperimentSpec;
use crate::types::IterationResult;

/// Something that can invoke a named tool. Implemented by `McpClient`;
/// tests substitute scripted invokers.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn invoke(&self, tool: &str, arguments: &Value) -> McpResult<Value>;
}

#[async_trait]
impl ToolInvoker for McpClient {
    async fn invoke(&self, tool: &str, arguments: &Value) -> McpResult<Value> {
        self.call_tool(tool, arguments).await
    }
}

/// Runs experiments one call at a time.
///
/// Each iteration is attempted exactly once and a failing iteration never
/// stops the experiment.
pub struct ExperimentRunner<I> {
    invoker: I,
}

impl<I: ToolInvoker> ExperimentRunner<I> {
    pub fn new(invoker: I) -> Self {
        Self { invoker }
    }

    pub async fn run(&self, spec: &ExperimentSpec) -> Vec<IterationResult> {
        self.run_with_progress(spec, |_| {}).await
    }

    /// Run the experiment, calling `on_iteration` after every call completes.
    pub async fn run_with_progress<F>(
        &self,
        spec: &ExperimentSpec,
        mut on_iteration: F,
    ) -> Vec<IterationResult>
    where
        F: FnMut(&IterationResult) + Send,
    {
        info!(
            tool = %spec.tool_name,
            server_url = %spec.server_url,
            iterations = spec.iterations,
            "Starting experiment"
        );

        let mut results = Vec::with_capacity(spec.iterations as usize);

        for iteration in 1..=spec.iterations {
            let start = Instant::now();
            let outcome = self.invoker.invoke(&spec.tool_name, &spec.arguments).await;
            let elapsed = start.elapsed();

            let result = IterationResult::from_outcome(iteration, elapsed, outcome);

            counter!("mcp_tool_calls_total", "status" => result.status.as_str()).increment(1);
            histogram!("mcp_tool_call_duration_ms").record(result.duration_ms);
            debug!(
                iteration = iteration,
                duration_ms = result.duration_ms,
                status = result.status.as_str(),
                "Tool call finished"
            );

            on_iteration(&result);
            results.push(result);
        }

        counter!("experiments_completed_total").increment(1);

        let successes = results.iter().filter(|r| r.status.is_success()).count();
        info!(
            tool = %spec.tool_name,
            iterations = results.len(),
            successes = successes,
            "Experiment complete"
        );

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IterationStatus;
    use mcp_protocol::McpError;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Fails every third call and records the arguments it saw.
    struct ScriptedInvoker {
        calls: AtomicU32,
        seen: Mutex<Vec<(String, Value)>>,
    }

    impl ScriptedInvoker {
        fn new() -> Self {
            Self {
                calls: AtomicU32::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ToolInvoker for ScriptedInvoker {
        async fn invoke(&self, tool: &str, arguments: &Value) -> McpResult<Value> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.seen
                .lock()
                .unwrap()
                .push((tool.to_string(), arguments.clone()));
            tokio::time::sleep(Duration::from_millis(2)).await;

            match n % 3 {
                0 => Err(McpError::from_rpc_value(json!({"code": -1, "message": "third"}))),
                _ => Ok(json!({"n": n})),
            }
        }
    }

    fn spec(iterations: u32) -> ExperimentSpec {
        ExperimentSpec::new(
            "http://localhost:8000/mcp",
            "echo",
            Some(r#"{"message": "hi"}"#),
            iterations,
            100,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_runs_exact_iteration_count() {
        let runner = ExperimentRunner::new(ScriptedInvoker::new());
        let results = runner.run(&spec(7)).await;

        assert_eq!(results.len(), 7);
        assert_eq!(runner.invoker.calls.load(Ordering::SeqCst), 7);
        let numbers: Vec<u32> = results.iter().map(|r| r.iteration).collect();
        assert_eq!(numbers, (1..=7).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_run() {
        let runner = ExperimentRunner::new(ScriptedInvoker::new());
        let results = runner.run(&spec(6)).await;

        let statuses: Vec<IterationStatus> = results.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                IterationStatus::Success,
                IterationStatus::Success,
                IterationStatus::Error,
                IterationStatus::Success,
                IterationStatus::Success,
                IterationStatus::Error,
            ]
        );
        assert_eq!(results[2].response, "third");
    }

    #[tokio::test]
    async fn test_same_arguments_every_call() {
        let runner = ExperimentRunner::new(ScriptedInvoker::new());
        runner.run(&spec(3)).await;

        let seen = runner.invoker.seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        for (tool, args) in seen.iter() {
            assert_eq!(tool, "echo");
            assert_eq!(args, &json!({"message": "hi"}));
        }
    }

    #[tokio::test]
    async fn test_durations_are_measured() {
        let runner = ExperimentRunner::new(ScriptedInvoker::new());
        let results = runner.run(&spec(2)).await;
        for r in &results {
            assert!(r.duration_ms >= 2.0, "duration {} too small", r.duration_ms);
        }
    }

    #[tokio::test]
    async fn test_progress_callback_sees_every_iteration() {
        let runner = ExperimentRunner::new(ScriptedInvoker::new());
        let mut seen = Vec::new();
        let results = runner
            .run_with_progress(&spec(4), |r| seen.push(r.iteration))
            .await;

        assert_eq!(seen, vec![1, 2, 3, 4]);
        assert_eq!(results.len(), 4);
    }
}
