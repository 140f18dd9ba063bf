//! Error types for the evaluation core
//!
//! Only problems detected before anything runs are errors. Everything that
//! happens once a submission is handed to the executor ends up in an
//! [`EvaluationReport`](crate::EvaluationReport) instead.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors raised before an evaluation reaches the executor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// Malformed catalog entry
    #[error("Invalid task: {0}")]
    InvalidTask(String),

    /// Malformed evaluation request
    #[error("Invalid evaluation request: {0}")]
    InvalidRequest(String),

    /// Invalid evaluator configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A catalog file could not be read or parsed
    #[error("Failed to load task catalog from {path:?}: {message}")]
    Catalog { path: PathBuf, message: String },

    /// Two catalog entries share an id
    #[error("Duplicate task id: {0}")]
    DuplicateTask(String),
}

impl EvalError {
    /// Create a new invalid task error
    pub fn invalid_task(message: impl Into<String>) -> Self {
        Self::InvalidTask(message.into())
    }

    /// Create a new invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create a new catalog error
    pub fn catalog(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Catalog {
            path: path.into(),
            message: message.into(),
        }
    }
}
