//! Text rendering of evaluation reports

use codetrainer_eval::{EvaluationReport, TestCaseResult, Value};
use colored::*;

/// Longest raw output shown after a failure
pub const MAX_RAW_OUTPUT_CHARS: usize = 8000;

/// Shorten `text` to at most `max_chars` characters, ending in "..." when cut
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Compact JSON rendering of a value
pub fn format_value(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}

/// Render a report for the terminal
pub fn render_report(report: &EvaluationReport) -> String {
    let mut lines = Vec::new();

    match report {
        EvaluationReport::Success {
            pass_count,
            total,
            details,
        } => {
            let summary = format!("Passed {}/{}", pass_count, total);
            lines.push(if pass_count == total {
                summary.green().bold().to_string()
            } else {
                summary.yellow().bold().to_string()
            });
            for detail in details {
                render_case(detail, &mut lines);
            }
        }
        EvaluationReport::Failure {
            kind,
            reason,
            raw_output,
        } => {
            lines.push(format!(
                "{} {}",
                format!("✗ {}:", kind).red().bold(),
                reason.red()
            ));
            if let Some(raw) = raw_output {
                lines.push(String::new());
                lines.push(truncate_text(raw.trim_end(), MAX_RAW_OUTPUT_CHARS).dimmed().to_string());
            }
        }
    }

    lines.join("\n")
}

fn render_case(detail: &TestCaseResult, lines: &mut Vec<String>) {
    if detail.passed {
        lines.push(format!("  {} {}", "✓".green(), detail.description));
        return;
    }

    lines.push(format!("  {} {}", "✗".red(), detail.description.bold()));
    lines.push(format!("      expected: {}", format_value(&detail.expected)));
    match (&detail.actual, &detail.error) {
        (_, Some(error)) => lines.push(format!("      error:    {}", error.red())),
        (Some(actual), None) => lines.push(format!("      actual:   {}", format_value(actual))),
        (None, None) => {}
    }
}
