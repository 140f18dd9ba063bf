//! Evaluation reports
//!
//! The typed result of one evaluation, and the interpreter that produces it
//! from raw execution output.

mod interpret;

pub use interpret::interpret;

use serde::{Deserialize, Serialize};

use crate::tasks::Value;

/// Reason used when the time budget ran out
pub const TIMEOUT_REASON: &str = "timeout";

/// Reason used when the caller cancelled the evaluation
pub const CANCELLED_REASON: &str = "cancelled";

/// Reason used for a non-zero exit with nothing on stderr
pub const EXECUTION_FAILED_REASON: &str = "execution failed";

/// Reason used when the program exited cleanly without a usable record
pub const INVALID_OUTPUT_REASON: &str = "invalid harness output";

/// Why an evaluation could not produce per-case results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The program did not finish within the time budget
    Timeout,
    /// The caller cancelled the evaluation
    Cancelled,
    /// The interpreter could not be started
    Spawn,
    /// The program exited abnormally (syntax error, missing callable, crash)
    Runtime,
    /// The program exited cleanly but broke the output contract
    Protocol,
}

impl FailureKind {
    /// Whether the failure lies with the evaluating system rather than the
    /// submitted code
    ///
    /// A [`FailureKind::Timeout`] is not infrastructure: a program that never
    /// finishes within its budget is charged to the submission.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, FailureKind::Spawn | FailureKind::Protocol)
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "Timeout",
            FailureKind::Cancelled => "Cancelled",
            FailureKind::Spawn => "Spawn Failure",
            FailureKind::Runtime => "Runtime Failure",
            FailureKind::Protocol => "Protocol Violation",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Outcome of a single test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseResult {
    /// Test case description
    pub description: String,

    /// Whether the returned value matched the expected one
    pub passed: bool,

    /// Expected value
    pub expected: Value,

    /// Returned value; absent when the call raised
    pub actual: Option<Value>,

    /// Exception kind and message, when the call raised
    pub error: Option<String>,
}

/// Result of one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EvaluationReport {
    /// The program ran; `details` holds one entry per test case, in order
    Success {
        pass_count: usize,
        total: usize,
        details: Vec<TestCaseResult>,
    },

    /// The program could not be evaluated
    Failure {
        kind: FailureKind,
        reason: String,
        raw_output: Option<String>,
    },
}

impl EvaluationReport {
    /// Create a failure report
    pub fn failure(kind: FailureKind, reason: impl Into<String>, raw_output: Option<String>) -> Self {
        Self::Failure {
            kind,
            reason: reason.into(),
            raw_output,
        }
    }

    /// Check whether the program ran to completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Check whether every test case passed
    pub fn all_passed(&self) -> bool {
        matches!(self, Self::Success { pass_count, total, .. } if pass_count == total)
    }

    /// Number of passing cases, if the program ran
    pub fn pass_count(&self) -> Option<usize> {
        match self {
            Self::Success { pass_count, .. } => Some(*pass_count),
            Self::Failure { .. } => None,
        }
    }

    /// Number of cases, if the program ran
    pub fn total(&self) -> Option<usize> {
        match self {
            Self::Success { total, .. } => Some(*total),
            Self::Failure { .. } => None,
        }
    }

    /// Per-case results; empty for failures
    pub fn details(&self) -> &[TestCaseResult] {
        match self {
            Self::Success { details, .. } => details,
            Self::Failure { .. } => &[],
        }
    }

    /// Failure kind, if the program could not be evaluated
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }

    /// Failure reason, if the program could not be evaluated
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason, .. } => Some(reason),
        }
    }
}
