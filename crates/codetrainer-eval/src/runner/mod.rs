//! Evaluation runner components
//!
//! This module provides harness synthesis and the isolated execution
//! infrastructure for running learner submissions.

mod config;
mod executor;
mod harness;
mod limits;
mod outcome;
mod sandbox;

pub use config::EvalConfig;
pub use executor::{IsolatedExecutor, PROGRAM_FILE_NAME, ProgramExecutor};
pub use harness::synthesize;
pub use limits::ResourceLimits;
pub use outcome::ExecutionOutcome;
pub use sandbox::Sandbox;
