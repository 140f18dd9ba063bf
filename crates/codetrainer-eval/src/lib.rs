//! Codetrainer evaluation core
//!
//! Takes learner-authored source plus the test cases of an exercise, runs the
//! source against every case in a separate process, and returns a structured
//! report that tolerates partial failure.
//!
//! # Pipeline
//!
//! - **Test Case Model** ([`tasks`]): immutable task and test case definitions
//! - **Harness Synthesizer** ([`runner::synthesize`]): learner source plus a
//!   generated driver that reads its cases as encoded data
//! - **Isolated Executor** ([`runner::IsolatedExecutor`]): child process in a
//!   throwaway directory, raced against a wall-clock timeout
//! - **Result Interpreter** ([`report::interpret`]): turns captured output into
//!   an [`EvaluationReport`]
//!
//! # Example
//!
//! ```rust,ignore
//! use codetrainer_eval::{EvalConfig, Evaluator, TaskRegistry};
//!
//! let registry = TaskRegistry::builtin()?;
//! let task = registry.get("sum_two_numbers").unwrap();
//! let evaluator = Evaluator::new(&EvalConfig::default())?;
//! let request = evaluator.request("def sum_two_numbers(a, b):\n    return a + b\n", task);
//! let report = evaluator.evaluate(&request).await?;
//! assert_eq!(report.pass_count(), Some(3));
//! ```

pub mod error;
pub mod evaluator;
pub mod protocol;
pub mod report;
pub mod runner;
pub mod tasks;

// Re-exports for convenience
pub use error::{EvalError, EvalResult};
pub use evaluator::{EvaluationRequest, Evaluator};
pub use report::{EvaluationReport, FailureKind, TestCaseResult, interpret};
pub use runner::{
    EvalConfig, ExecutionOutcome, IsolatedExecutor, ProgramExecutor, ResourceLimits, synthesize,
};
pub use tasks::{Task, TaskLoader, TaskRegistry, TestCase, Value, values_equal};
