//! CLI argument definitions using clap
//!
//! - codetrainer list                  # List exercises
//! - codetrainer show <id>             # Show an exercise and its starter source
//! - codetrainer eval <id> -f sol.py   # Grade a solution
//! - codetrainer eval <id> --starter   # Grade the starter source

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "codetrainer")]
#[command(about = "Codetrainer - practice small programming exercises")]
#[command(version)]
pub struct Cli {
    /// Evaluation config file (JSON or YAML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Load exercises from this directory instead of the built-in catalog
    #[arg(long, global = true)]
    pub tasks_dir: Option<PathBuf>,

    /// Interpreter used to run submissions
    #[arg(long, global = true, env = "CODETRAINER_INTERPRETER")]
    pub interpreter: Option<PathBuf>,

    /// Execution timeout in seconds
    #[arg(
        long,
        global = true,
        env = "CODETRAINER_TIMEOUT",
        value_parser = clap::value_parser!(u64).range(1..=20)
    )]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List available exercises
    List,

    /// Show an exercise
    Show {
        /// Exercise id
        id: String,
    },

    /// Grade a solution against an exercise's test cases
    Eval {
        /// Exercise id
        id: String,

        /// Solution file (reads stdin when omitted)
        #[arg(short, long, conflicts_with = "starter")]
        file: Option<PathBuf>,

        /// Grade the exercise's starter source
        #[arg(long)]
        starter: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

/// How evaluation results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored human-readable summary
    Text,
    /// The report as JSON
    Json,
}
