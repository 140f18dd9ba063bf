//! Raw result of running a synthesized program

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What happened to the child process. Consumed by the result interpreter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Exit code, if the process exited normally
    pub exit_code: Option<i32>,

    /// Signal that terminated the process (Unix)
    #[serde(default)]
    pub signal: Option<i32>,

    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,

    /// The process was killed because the time budget ran out
    pub timed_out: bool,

    /// The caller cancelled the execution
    #[serde(default)]
    pub cancelled: bool,

    /// The process could not be started
    pub spawn_error: Option<String>,

    /// At least one stream exceeded the capture limit
    #[serde(default)]
    pub output_truncated: bool,

    /// Wall-clock time from spawn to reclamation
    #[serde(default)]
    pub duration: Duration,
}

impl ExecutionOutcome {
    /// Outcome for a process that never started
    pub fn spawn_failed(error: impl Into<String>) -> Self {
        Self {
            spawn_error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Outcome for a process that exited with `code`
    pub fn exited(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(code),
            stdout: stdout.into(),
            stderr: stderr.into(),
            ..Default::default()
        }
    }

    /// Whether the process exited on its own with status 0
    pub fn success(&self) -> bool {
        self.exit_code == Some(0) && !self.timed_out && !self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let outcome = ExecutionOutcome::spawn_failed("no interpreter");
        assert_eq!(outcome.spawn_error.as_deref(), Some("no interpreter"));
        assert_eq!(outcome.exit_code, None);
        assert!(!outcome.success());

        let outcome = ExecutionOutcome::exited(0, "out", "");
        assert!(outcome.success());
        assert_eq!(outcome.stdout, "out");

        assert!(!ExecutionOutcome::exited(1, "", "boom").success());
    }
}
