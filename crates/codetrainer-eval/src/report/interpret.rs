//! Result interpretation
//!
//! Pure mapping from an [`ExecutionOutcome`] to an [`EvaluationReport`]:
//!
//! | condition                        | report                                   |
//! |----------------------------------|------------------------------------------|
//! | timed out                        | `Failure { reason: "timeout" }`          |
//! | cancelled                        | `Failure { reason: "cancelled" }`        |
//! | spawn error                      | `Failure { reason: <spawn error> }`      |
//! | exit code != 0                   | `Failure { reason: <stderr> }`           |
//! | exit code 0, no valid record     | `Failure { reason: "invalid harness output" }` |
//! | exit code 0, valid record        | `Success { .. }`                         |

use super::{
    CANCELLED_REASON, EXECUTION_FAILED_REASON, EvaluationReport, FailureKind,
    INVALID_OUTPUT_REASON, TIMEOUT_REASON, TestCaseResult,
};
use crate::protocol::{PROTOCOL_VERSION, RECORD_MARKER, Record};
use crate::runner::ExecutionOutcome;
use crate::tasks::values_equal;

/// Turn captured execution output into an evaluation report
pub fn interpret(outcome: &ExecutionOutcome) -> EvaluationReport {
    if outcome.timed_out {
        return EvaluationReport::failure(
            FailureKind::Timeout,
            TIMEOUT_REASON,
            first_non_empty(&[&outcome.stderr, &outcome.stdout]),
        );
    }

    if outcome.cancelled {
        return EvaluationReport::failure(
            FailureKind::Cancelled,
            CANCELLED_REASON,
            first_non_empty(&[&outcome.stderr, &outcome.stdout]),
        );
    }

    if let Some(error) = &outcome.spawn_error {
        return EvaluationReport::failure(FailureKind::Spawn, error.clone(), None);
    }

    if outcome.exit_code != Some(0) {
        let stderr = outcome.stderr.trim();
        let reason = if !stderr.is_empty() {
            stderr.to_string()
        } else if let Some(signal) = outcome.signal {
            format!("{}: terminated by signal {}", EXECUTION_FAILED_REASON, signal)
        } else {
            EXECUTION_FAILED_REASON.to_string()
        };
        let combined = format!("{}{}", outcome.stdout, outcome.stderr);
        return EvaluationReport::failure(FailureKind::Runtime, reason, non_empty(combined));
    }

    match parse_record(&outcome.stdout) {
        Ok(report) => report,
        Err(problem) => {
            tracing::debug!(problem = %problem, "Rejected harness output");
            EvaluationReport::failure(
                FailureKind::Protocol,
                INVALID_OUTPUT_REASON,
                non_empty(outcome.stdout.clone()),
            )
        }
    }
}

/// Locate, parse and validate the record line
fn parse_record(stdout: &str) -> Result<EvaluationReport, String> {
    let line = stdout
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .ok_or("no output")?;

    let json = line
        .trim_end()
        .strip_prefix(RECORD_MARKER)
        .and_then(|rest| rest.strip_prefix(' '))
        .ok_or("last line is not a result record")?;

    let record: Record =
        serde_json::from_str(json).map_err(|e| format!("malformed record: {}", e))?;

    if record.version != PROTOCOL_VERSION {
        return Err(format!("unsupported record version {}", record.version));
    }
    if record.total != record.details.len() {
        return Err(format!(
            "total {} does not match {} details",
            record.total,
            record.details.len()
        ));
    }
    if record.pass_count > record.total {
        return Err(format!(
            "pass_count {} exceeds total {}",
            record.pass_count, record.total
        ));
    }

    let passed = record.details.iter().filter(|d| d.passed).count();
    if passed != record.pass_count {
        return Err(format!(
            "pass_count {} does not match {} passing details",
            record.pass_count, passed
        ));
    }

    if let Some(detail) = record
        .details
        .iter()
        .find(|d| d.passed && (d.error.is_some() || !values_equal(&d.actual, &d.expected)))
    {
        return Err(format!(
            "case '{}' is marked passed but its output does not match",
            detail.description
        ));
    }

    let details = record
        .details
        .into_iter()
        .map(|detail| TestCaseResult {
            actual: detail.error.is_none().then_some(detail.actual),
            description: detail.description,
            passed: detail.passed,
            expected: detail.expected,
            error: detail.error,
        })
        .collect();

    Ok(EvaluationReport::Success {
        pass_count: record.pass_count,
        total: record.total,
        details,
    })
}

fn first_non_empty(candidates: &[&String]) -> Option<String> {
    candidates
        .iter()
        .find(|text| !text.trim().is_empty())
        .map(|text| text.to_string())
}

fn non_empty(text: String) -> Option<String> {
    if text.trim().is_empty() { None } else { Some(text) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::RecordDetail;
    use serde_json::json;

    fn detail(description: &str, passed: bool, expected: i64, actual: Option<i64>) -> RecordDetail {
        RecordDetail {
            description: description.to_string(),
            passed,
            expected: json!(expected),
            actual: actual.map(|a| json!(a)).unwrap_or(json!(null)),
            error: None,
        }
    }

    fn record_line(pass_count: usize, details: Vec<RecordDetail>) -> String {
        Record {
            version: PROTOCOL_VERSION,
            pass_count,
            total: details.len(),
            details,
        }
        .to_line()
        .unwrap()
    }

    fn buggy_sum_record() -> String {
        record_line(
            1,
            vec![
                detail("small positives", false, 3, Some(-1)),
                detail("with zero", false, 5, Some(-5)),
                detail("negatives", true, -10, Some(-10)),
            ],
        )
    }

    #[test]
    fn test_success_reconstructed_from_record() {
        let stdout = format!("learner debug print\n{}\n", buggy_sum_record());
        let report = interpret(&ExecutionOutcome::exited(0, stdout, ""));

        match report {
            EvaluationReport::Success {
                pass_count,
                total,
                details,
            } => {
                assert_eq!(pass_count, 1);
                assert_eq!(total, 3);
                assert_eq!(details.len(), 3);
                assert_eq!(details[0].description, "small positives");
                assert_eq!(details[0].expected, json!(3));
                assert_eq!(details[0].actual, Some(json!(-1)));
                assert!(!details[0].passed);
                assert!(details[2].passed);
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_error_cases_have_no_actual() {
        let mut raising = detail("boom", false, 3, None);
        raising.error = Some("ZeroDivisionError: division by zero".to_string());
        let stdout = record_line(0, vec![raising]);

        let report = interpret(&ExecutionOutcome::exited(0, stdout, ""));
        let details = report.details();
        assert_eq!(report.pass_count(), Some(0));
        assert_eq!(details[0].actual, None);
        assert_eq!(
            details[0].error.as_deref(),
            Some("ZeroDivisionError: division by zero")
        );
    }

    #[test]
    fn test_returned_none_is_kept_as_null() {
        let stdout = record_line(0, vec![detail("none", false, 1, None)]);
        let report = interpret(&ExecutionOutcome::exited(0, stdout, ""));
        assert_eq!(report.details()[0].actual, Some(json!(null)));
    }

    #[test]
    fn test_timeout() {
        let outcome = ExecutionOutcome {
            timed_out: true,
            stdout: "partial".to_string(),
            ..Default::default()
        };
        assert_eq!(
            interpret(&outcome),
            EvaluationReport::failure(
                FailureKind::Timeout,
                "timeout",
                Some("partial".to_string())
            )
        );

        let outcome = ExecutionOutcome {
            timed_out: true,
            stdout: "partial".to_string(),
            stderr: "Traceback".to_string(),
            ..Default::default()
        };
        assert_eq!(
            interpret(&outcome),
            EvaluationReport::failure(
                FailureKind::Timeout,
                "timeout",
                Some("Traceback".to_string())
            )
        );
    }

    #[test]
    fn test_timeout_wins_over_valid_record() {
        let outcome = ExecutionOutcome {
            timed_out: true,
            exit_code: Some(0),
            stdout: buggy_sum_record(),
            ..Default::default()
        };
        assert_eq!(interpret(&outcome).failure_kind(), Some(FailureKind::Timeout));
    }

    #[test]
    fn test_cancelled() {
        let outcome = ExecutionOutcome {
            cancelled: true,
            ..Default::default()
        };
        assert_eq!(
            interpret(&outcome),
            EvaluationReport::failure(FailureKind::Cancelled, "cancelled", None)
        );
    }

    #[test]
    fn test_spawn_error() {
        let outcome = ExecutionOutcome::spawn_failed("failed to spawn interpreter \"python9\"");
        assert_eq!(
            interpret(&outcome),
            EvaluationReport::failure(
                FailureKind::Spawn,
                "failed to spawn interpreter \"python9\"",
                None
            )
        );
    }

    #[test]
    fn test_nonzero_exit_uses_stderr() {
        let outcome = ExecutionOutcome::exited(
            1,
            "before crash\n",
            "  File \"harness.py\", line 2\nSyntaxError: invalid syntax\n",
        );
        match interpret(&outcome) {
            EvaluationReport::Failure {
                kind,
                reason,
                raw_output,
            } => {
                assert_eq!(kind, FailureKind::Runtime);
                assert!(reason.ends_with("SyntaxError: invalid syntax"));
                assert_eq!(
                    raw_output.as_deref(),
                    Some("before crash\n  File \"harness.py\", line 2\nSyntaxError: invalid syntax\n")
                );
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_nonzero_exit_with_valid_record_is_still_failure() {
        let outcome = ExecutionOutcome::exited(1, buggy_sum_record(), "");
        assert_eq!(
            interpret(&outcome),
            EvaluationReport::failure(
                FailureKind::Runtime,
                "execution failed",
                Some(buggy_sum_record())
            )
        );
    }

    #[test]
    fn test_signal_without_stderr() {
        let outcome = ExecutionOutcome {
            signal: Some(9),
            ..Default::default()
        };
        assert_eq!(
            interpret(&outcome).failure_reason(),
            Some("execution failed: terminated by signal 9")
        );
    }

    #[test]
    fn test_missing_record_is_protocol_violation() {
        for stdout in ["", "hello\n", "{\"pass_count\": 1}\n"] {
            let report = interpret(&ExecutionOutcome::exited(0, stdout, ""));
            assert_eq!(report.failure_kind(), Some(FailureKind::Protocol));
            assert_eq!(report.failure_reason(), Some("invalid harness output"));
        }
    }

    #[test]
    fn test_record_not_last_is_protocol_violation() {
        let stdout = format!("{}\ntrailing output\n", buggy_sum_record());
        let report = interpret(&ExecutionOutcome::exited(0, stdout.clone(), ""));
        assert_eq!(
            report,
            EvaluationReport::failure(FailureKind::Protocol, "invalid harness output", Some(stdout))
        );
    }

    #[test]
    fn test_malformed_records_rejected() {
        let bad_lines = [
            format!("{} not json", RECORD_MARKER),
            format!("{} {{\"version\": 1, \"pass_count\": 0, \"total\": 0}}", RECORD_MARKER),
            format!(
                "{} {{\"version\": 2, \"pass_count\": 0, \"total\": 0, \"details\": []}}",
                RECORD_MARKER
            ),
            // total disagrees with details
            format!(
                "{} {{\"version\": 1, \"pass_count\": 0, \"total\": 2, \"details\": []}}",
                RECORD_MARKER
            ),
            // pass_count exceeds total
            format!(
                "{} {{\"version\": 1, \"pass_count\": 1, \"total\": 0, \"details\": []}}",
                RECORD_MARKER
            ),
            // pass_count disagrees with passing details
            record_line(0, vec![detail("a", true, 1, Some(1))]),
            // claims a pass for a mismatched value
            record_line(1, vec![detail("a", true, 1, Some(2))]),
        ];

        for line in bad_lines {
            let report = interpret(&ExecutionOutcome::exited(0, line.clone(), ""));
            assert_eq!(
                report.failure_kind(),
                Some(FailureKind::Protocol),
                "accepted: {}",
                line
            );
        }
    }

    #[test]
    fn test_interpret_is_idempotent() {
        let outcomes = [
            ExecutionOutcome::exited(0, buggy_sum_record(), ""),
            ExecutionOutcome::exited(0, "nothing", ""),
            ExecutionOutcome::exited(2, "", "NameError: callable 'f' is not defined"),
            ExecutionOutcome::spawn_failed("missing"),
        ];

        for outcome in &outcomes {
            assert_eq!(interpret(outcome), interpret(outcome));
        }
    }

    #[test]
    fn test_windows_line_endings() {
        let stdout = format!("{}\r\n", buggy_sum_record());
        let report = interpret(&ExecutionOutcome::exited(0, stdout, ""));
        assert_eq!(report.pass_count(), Some(1));
    }
}
