//! Command routing logic for CLI

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use codetrainer_eval::{EvalConfig, TaskLoader, TaskRegistry};

use crate::args::{Cli, Commands};
use crate::commands;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> Result<ExitCode> {
    let registry = load_registry(cli.tasks_dir.as_deref())?;

    match &cli.command {
        Commands::List => {
            commands::tasks::list(&registry);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Show { id } => {
            commands::tasks::show(&registry, id)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Eval {
            id,
            file,
            starter,
            format,
        } => {
            let config = build_config(&cli)?;
            commands::eval::run(&registry, &config, id, file.as_deref(), *starter, *format).await
        }
    }
}

/// Built-in catalog, or the exercises found in `tasks_dir`
fn load_registry(tasks_dir: Option<&Path>) -> Result<TaskRegistry> {
    match tasks_dir {
        Some(dir) => {
            let tasks = TaskLoader::new(dir).load_all()?;
            tracing::debug!(count = tasks.len(), dir = %dir.display(), "Loaded exercises");
            Ok(TaskRegistry::new(tasks)?)
        }
        None => Ok(TaskRegistry::builtin()?),
    }
}

/// Config file (or defaults) with command-line overrides applied
fn build_config(cli: &Cli) -> Result<EvalConfig> {
    let mut config = match &cli.config {
        Some(path) => EvalConfig::from_file(path)?,
        None => EvalConfig::default(),
    };

    if let Some(interpreter) = &cli.interpreter {
        config.interpreter = interpreter.clone();
    }
    if let Some(timeout) = cli.timeout {
        config = config.with_timeout(timeout);
    }

    config.validate()?;
    Ok(config)
}
