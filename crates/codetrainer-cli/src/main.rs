//! Codetrainer CLI application
//!
//! Browse the exercise catalog and grade solutions from the terminal.
//!
//! # Installation
//!
//! ```bash
//! cargo install --path crates/codetrainer-cli
//! ```
//!
//! # Usage
//!
//! ```bash
//! codetrainer list
//! codetrainer show fizz_buzz
//! codetrainer eval fizz_buzz --file fizz_buzz.py
//! cat solution.py | codetrainer eval sum_two_numbers --format json
//! ```
//!
//! `eval` exits with 0 when every test case passed, 1 when the submission
//! failed, and 2 when the evaluation could not run at all.

mod args;
mod commands;
mod console;
mod render;
mod router;

use std::process::ExitCode;

use clap::Parser;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize logging with environment-based filtering
    // Set RUST_LOG=debug for verbose logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    router::route(cli).await
}
