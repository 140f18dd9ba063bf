//! Evaluation configuration
//!
//! Configuration options for running evaluations.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::ResourceLimits;
use crate::error::{EvalError, EvalResult};

/// Configuration for evaluation runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Wall-clock budget per evaluation in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Interpreter used to run the synthesized program
    #[serde(default = "default_interpreter")]
    pub interpreter: PathBuf,

    /// Arguments placed before the program path
    #[serde(default = "default_interpreter_args")]
    pub interpreter_args: Vec<String>,

    /// Capture limit per output stream in bytes
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: u64,

    /// Resource limits for the child process
    #[serde(default)]
    pub limits: ResourceLimits,
}

fn default_timeout() -> u64 {
    3
}

fn default_interpreter() -> PathBuf {
    PathBuf::from("python3")
}

fn default_interpreter_args() -> Vec<String> {
    // Isolated mode (no user site, no env vars) and unbuffered streams
    vec!["-I".to_string(), "-u".to_string()]
}

fn default_max_output_bytes() -> u64 {
    1024 * 1024
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            interpreter: default_interpreter(),
            interpreter_args: default_interpreter_args(),
            max_output_bytes: default_max_output_bytes(),
            limits: ResourceLimits::default(),
        }
    }
}

impl EvalConfig {
    /// Load a config from a JSON or YAML file
    pub fn from_file(path: impl AsRef<Path>) -> EvalResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EvalError::config(format!("failed to read {:?}: {}", path, e)))?;

        let config: Self = if path
            .extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml")
        {
            serde_yaml::from_str(&content)
                .map_err(|e| EvalError::config(format!("invalid YAML in {:?}: {}", path, e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| EvalError::config(format!("invalid JSON in {:?}: {}", path, e)))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Set timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the interpreter and its leading arguments
    pub fn with_interpreter(
        mut self,
        interpreter: impl Into<PathBuf>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.interpreter = interpreter.into();
        self.interpreter_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the per-stream capture limit
    pub fn with_max_output_bytes(mut self, bytes: u64) -> Self {
        self.max_output_bytes = bytes;
        self
    }

    /// Set resource limits
    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Get the timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the configuration for values the executor cannot work with
    pub fn validate(&self) -> EvalResult<()> {
        if self.timeout_secs == 0 {
            return Err(EvalError::config("timeout_secs must be greater than 0"));
        }
        if self.interpreter.as_os_str().is_empty() {
            return Err(EvalError::config("interpreter must not be empty"));
        }
        if self.max_output_bytes == 0 {
            return Err(EvalError::config("max_output_bytes must be greater than 0"));
        }
        Ok(())
    }
}
