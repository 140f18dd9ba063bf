//! Grade a solution against an exercise

use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use codetrainer_eval::{EvalConfig, EvaluationReport, Evaluator, TaskRegistry};
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

use crate::args::OutputFormat;
use crate::console::CliConsole;
use crate::render::render_report;

/// JSON output of `eval`
#[derive(Debug, Serialize)]
struct EvalOutput<'a> {
    task_id: &'a str,
    #[serde(flatten)]
    report: &'a EvaluationReport,
}

/// Run an evaluation and print the report
pub async fn run(
    registry: &TaskRegistry,
    config: &EvalConfig,
    id: &str,
    file: Option<&Path>,
    starter: bool,
    format: OutputFormat,
) -> Result<ExitCode> {
    let task = registry
        .get(id)
        .with_context(|| format!("Unknown exercise '{}'", id))?;

    let source = if starter {
        task.starter_source.clone()
    } else {
        read_source(file).await?
    };

    let evaluator = Evaluator::new(config)?;
    let request = evaluator.request(source, task);

    // Ctrl-C stops the child instead of leaving it behind
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let report = evaluator.evaluate_with_cancel(&request, cancel).await;
    watcher.abort();
    let report = report?;

    match format {
        OutputFormat::Text => {
            let console = CliConsole::new(true);
            console.print_header(&task.title);
            println!("{}", render_report(&report));
            println!();
            if report.all_passed() {
                console.success("All tests passed");
            } else if report.failure_kind().is_some_and(|kind| kind.is_infrastructure()) {
                console.error("The evaluation could not run; check the interpreter settings");
            } else {
                console.info("Keep going! Fix the failing cases and run again.");
            }
        }
        OutputFormat::Json => {
            let output = EvalOutput {
                task_id: &task.id,
                report: &report,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(ExitCode::from(exit_status(&report)))
}

/// 0 when every case passed, 2 when the evaluation itself broke, 1 otherwise
fn exit_status(report: &EvaluationReport) -> u8 {
    if report.all_passed() {
        0
    } else if report.failure_kind().is_some_and(|kind| kind.is_infrastructure()) {
        2
    } else {
        1
    }
}

/// Read the submission from `file`, or from stdin
async fn read_source(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read solution from {}", path.display())),
        None => {
            if std::io::stdin().is_terminal() {
                CliConsole::new(true).warn("Reading solution from stdin (end with Ctrl-D)");
            }
            let mut source = String::new();
            tokio::io::stdin()
                .read_to_string(&mut source)
                .await
                .context("Failed to read solution from stdin")?;
            Ok(source)
        }
    }
}
