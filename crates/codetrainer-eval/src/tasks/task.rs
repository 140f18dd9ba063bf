//! Core exercise types
//!
//! Defines the structure of an exercise and of the test cases it is graded on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Value;
use crate::error::{EvalError, EvalResult};

/// One test case of an exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Human-readable description shown next to the result
    pub description: String,

    /// Positional arguments, in call order
    #[serde(default, rename = "args")]
    pub positional_args: Vec<Value>,

    /// Keyword arguments
    #[serde(default, rename = "kwargs")]
    pub keyword_args: BTreeMap<String, Value>,

    /// Value the target callable must return
    #[serde(rename = "expected")]
    pub expected_output: Value,
}

impl TestCase {
    /// Create a test case with positional arguments only
    pub fn new(description: impl Into<String>, args: Vec<Value>, expected: Value) -> Self {
        Self {
            description: description.into(),
            positional_args: args,
            keyword_args: BTreeMap::new(),
            expected_output: expected,
        }
    }

    /// Add a keyword argument
    pub fn with_kwarg(mut self, name: impl Into<String>, value: Value) -> Self {
        self.keyword_args.insert(name.into(), value);
        self
    }
}

/// An exercise definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier for the task
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// Prompt shown to the learner
    pub description: String,

    /// Name of the callable the submission must define
    #[serde(alias = "function_name")]
    pub target_callable_name: String,

    /// Source the learner starts from
    #[serde(default, alias = "starter_code")]
    pub starter_source: String,

    /// Test cases, graded in order
    pub tests: Vec<TestCase>,
}

impl Task {
    /// Create a new task without starter source
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        target_callable_name: impl Into<String>,
        tests: Vec<TestCase>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            target_callable_name: target_callable_name.into(),
            starter_source: String::new(),
            tests,
        }
    }

    /// Set the starter source
    pub fn with_starter_source(mut self, source: impl Into<String>) -> Self {
        self.starter_source = source.into();
        self
    }

    /// Check that the task can be evaluated
    pub fn validate(&self) -> EvalResult<()> {
        if self.target_callable_name.trim().is_empty() {
            return Err(EvalError::invalid_task(format!(
                "task '{}' has a blank target callable name",
                self.id
            )));
        }
        if self.tests.is_empty() {
            return Err(EvalError::invalid_task(format!(
                "task '{}' has no test cases",
                self.id
            )));
        }
        Ok(())
    }
}
