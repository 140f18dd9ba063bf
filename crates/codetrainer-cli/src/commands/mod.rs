//! CLI commands

pub mod eval;
pub mod tasks;
