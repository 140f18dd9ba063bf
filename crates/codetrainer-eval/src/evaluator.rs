//! Evaluation entry point
//!
//! Wires the pipeline together: validate the request, synthesize the harness,
//! run it through a [`ProgramExecutor`], interpret the outcome.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{EvalError, EvalResult};
use crate::report::{EvaluationReport, interpret};
use crate::runner::{EvalConfig, IsolatedExecutor, ProgramExecutor, synthesize};
use crate::tasks::Task;

/// One submission to grade against one task
#[derive(Debug, Clone)]
pub struct EvaluationRequest<'a> {
    /// Learner-authored source, taken verbatim
    pub source: String,

    /// Task whose test cases are run
    pub task: &'a Task,

    /// Wall-clock budget for the whole run
    pub timeout: Duration,
}

impl<'a> EvaluationRequest<'a> {
    /// Create a new request
    pub fn new(source: impl Into<String>, task: &'a Task, timeout: Duration) -> Self {
        Self {
            source: source.into(),
            task,
            timeout,
        }
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn validate(&self) -> EvalResult<()> {
        if self.timeout.is_zero() {
            return Err(EvalError::invalid_request("timeout must be greater than 0"));
        }
        self.task.validate()
    }
}

/// Grades submissions
///
/// Holds no per-evaluation state, so one evaluator can serve any number of
/// concurrent evaluations.
#[derive(Clone)]
pub struct Evaluator {
    executor: Arc<dyn ProgramExecutor>,
    default_timeout: Duration,
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}

impl Evaluator {
    /// Create an evaluator backed by an [`IsolatedExecutor`]
    pub fn new(config: &EvalConfig) -> EvalResult<Self> {
        config.validate()?;
        Ok(Self {
            executor: Arc::new(IsolatedExecutor::new(config)),
            default_timeout: config.timeout(),
        })
    }

    /// Create an evaluator with a custom executor
    pub fn with_executor(executor: Arc<dyn ProgramExecutor>, default_timeout: Duration) -> Self {
        Self {
            executor,
            default_timeout,
        }
    }

    /// Timeout used by [`Evaluator::request`]
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Build a request using the default timeout
    pub fn request<'a>(&self, source: impl Into<String>, task: &'a Task) -> EvaluationRequest<'a> {
        EvaluationRequest::new(source, task, self.default_timeout)
    }

    /// Evaluate a submission
    ///
    /// Returns an error only when the request itself is unusable. Anything that
    /// goes wrong while running the submission is reported as
    /// [`EvaluationReport::Failure`].
    pub async fn evaluate(&self, request: &EvaluationRequest<'_>) -> EvalResult<EvaluationReport> {
        self.evaluate_with_cancel(request, CancellationToken::new())
            .await
    }

    /// Evaluate a submission, stopping early when `cancel` fires
    pub async fn evaluate_with_cancel(
        &self,
        request: &EvaluationRequest<'_>,
        cancel: CancellationToken,
    ) -> EvalResult<EvaluationReport> {
        request.validate()?;

        let task = request.task;
        tracing::debug!(
            task_id = %task.id,
            cases = task.tests.len(),
            timeout_ms = request.timeout.as_millis() as u64,
            "Starting evaluation"
        );

        let program = synthesize(&request.source, task);
        let outcome = self.executor.run(&program, request.timeout, &cancel).await;
        let report = interpret(&outcome);

        match &report {
            EvaluationReport::Success {
                pass_count, total, ..
            } => {
                tracing::info!(
                    task_id = %task.id,
                    pass_count = *pass_count,
                    total = *total,
                    duration_ms = outcome.duration.as_millis() as u64,
                    "Evaluation finished"
                );
            }
            EvaluationReport::Failure { kind, reason, .. } => {
                if kind.is_infrastructure() {
                    tracing::warn!(
                        task_id = %task.id,
                        kind = %kind,
                        reason = %reason,
                        "Evaluation could not run"
                    );
                } else {
                    tracing::info!(
                        task_id = %task.id,
                        kind = %kind,
                        duration_ms = outcome.duration.as_millis() as u64,
                        "Evaluation failed"
                    );
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{PROTOCOL_VERSION, Record, RecordDetail};
    use crate::report::FailureKind;
    use crate::runner::ExecutionOutcome;
    use crate::tasks::TestCase;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Executor that records what it was asked to run and replays a canned outcome
    struct FakeExecutor {
        outcome: ExecutionOutcome,
        seen: Mutex<Vec<(String, Duration)>>,
    }

    impl FakeExecutor {
        fn new(outcome: ExecutionOutcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn runs(&self) -> Vec<(String, Duration)> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProgramExecutor for FakeExecutor {
        async fn run(
            &self,
            program_text: &str,
            timeout: Duration,
            cancel: &CancellationToken,
        ) -> ExecutionOutcome {
            self.seen
                .lock()
                .unwrap()
                .push((program_text.to_string(), timeout));
            if cancel.is_cancelled() {
                return ExecutionOutcome {
                    cancelled: true,
                    ..Default::default()
                };
            }
            self.outcome.clone()
        }
    }

    fn sum_task() -> Task {
        Task::new(
            "sum_two_numbers",
            "Sum Two Numbers",
            "Return a + b",
            "sum_two_numbers",
            vec![
                TestCase::new("small positives", vec![json!(1), json!(2)], json!(3)),
                TestCase::new("negatives", vec![json!(-4), json!(-6)], json!(-10)),
            ],
        )
    }

    fn all_pass_stdout() -> String {
        Record {
            version: PROTOCOL_VERSION,
            pass_count: 2,
            total: 2,
            details: vec![
                RecordDetail {
                    description: "small positives".to_string(),
                    passed: true,
                    expected: json!(3),
                    actual: json!(3),
                    error: None,
                },
                RecordDetail {
                    description: "negatives".to_string(),
                    passed: true,
                    expected: json!(-10),
                    actual: json!(-10),
                    error: None,
                },
            ],
        }
        .to_line()
        .unwrap()
    }

    #[tokio::test]
    async fn test_evaluate_passes_synthesized_program_to_executor() {
        let executor = FakeExecutor::new(ExecutionOutcome::exited(0, all_pass_stdout(), ""));
        let evaluator = Evaluator::with_executor(executor.clone(), Duration::from_secs(3));
        let task = sum_task();
        let source = "def sum_two_numbers(a, b):\n    return a + b\n";

        let report = evaluator
            .evaluate(&evaluator.request(source, &task))
            .await
            .unwrap();

        assert!(report.all_passed());
        assert_eq!(report.pass_count(), Some(2));

        let runs = executor.runs();
        assert_eq!(runs.len(), 1);
        assert!(runs[0].0.starts_with(source));
        assert_eq!(runs[0].0, synthesize(source, &task));
        assert_eq!(runs[0].1, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_request_timeout_is_forwarded() {
        let executor = FakeExecutor::new(ExecutionOutcome::exited(0, all_pass_stdout(), ""));
        let evaluator = Evaluator::with_executor(executor.clone(), Duration::from_secs(3));
        let task = sum_task();

        let request = evaluator
            .request("", &task)
            .with_timeout(Duration::from_millis(750));
        evaluator.evaluate(&request).await.unwrap();

        assert_eq!(executor.runs()[0].1, Duration::from_millis(750));
    }

    #[tokio::test]
    async fn test_zero_timeout_rejected_before_running() {
        let executor = FakeExecutor::new(ExecutionOutcome::default());
        let evaluator = Evaluator::with_executor(executor.clone(), Duration::from_secs(3));
        let task = sum_task();

        let request = EvaluationRequest::new("", &task, Duration::ZERO);
        let result = evaluator.evaluate(&request).await;

        assert!(matches!(result, Err(EvalError::InvalidRequest(_))));
        assert!(executor.runs().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_task_rejected_before_running() {
        let executor = FakeExecutor::new(ExecutionOutcome::default());
        let evaluator = Evaluator::with_executor(executor.clone(), Duration::from_secs(3));
        let task = Task::new("empty", "Empty", "", "f", vec![]);

        let result = evaluator.evaluate(&evaluator.request("", &task)).await;

        assert!(matches!(result, Err(EvalError::InvalidTask(_))));
        assert!(executor.runs().is_empty());
    }

    #[tokio::test]
    async fn test_execution_problems_become_failure_reports() {
        let task = sum_task();
        let cases = [
            (
                ExecutionOutcome {
                    timed_out: true,
                    ..Default::default()
                },
                FailureKind::Timeout,
            ),
            (
                ExecutionOutcome::exited(1, "", "SyntaxError: invalid syntax"),
                FailureKind::Runtime,
            ),
            (
                ExecutionOutcome::spawn_failed("no such interpreter"),
                FailureKind::Spawn,
            ),
            (ExecutionOutcome::exited(0, "", ""), FailureKind::Protocol),
        ];

        for (outcome, kind) in cases {
            let evaluator =
                Evaluator::with_executor(FakeExecutor::new(outcome), Duration::from_secs(3));
            let report = evaluator
                .evaluate(&evaluator.request("", &task))
                .await
                .unwrap();
            assert_eq!(report.failure_kind(), Some(kind));
        }
    }

    #[tokio::test]
    async fn test_cancelled_token_reports_cancelled() {
        let executor = FakeExecutor::new(ExecutionOutcome::exited(0, all_pass_stdout(), ""));
        let evaluator = Evaluator::with_executor(executor, Duration::from_secs(3));
        let task = sum_task();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = evaluator
            .evaluate_with_cancel(&evaluator.request("", &task), cancel)
            .await
            .unwrap();

        assert_eq!(report.failure_kind(), Some(FailureKind::Cancelled));
        assert_eq!(report.failure_reason(), Some("cancelled"));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = EvalConfig::default().with_timeout(0);
        assert!(matches!(
            Evaluator::new(&config),
            Err(EvalError::InvalidConfig(_))
        ));

        let evaluator = Evaluator::new(&EvalConfig::default().with_timeout(5)).unwrap();
        assert_eq!(evaluator.default_timeout(), Duration::from_secs(5));
    }
}
