//! Wire contract between the synthesized driver and the result interpreter
//!
//! Test cases travel into the driver as a base64-encoded JSON payload. The
//! driver answers with a single record line on stdout: [`RECORD_MARKER`], a
//! space, then compact ASCII JSON. It must be the last non-empty line.
//!
//! Bump [`PROTOCOL_VERSION`] whenever either shape changes.

use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::tasks::{Task, Value};

/// Version carried by both the payload and the record
pub const PROTOCOL_VERSION: u32 = 1;

/// Prefix of the record line
pub const RECORD_MARKER: &str = "@@CODETRAINER_RESULT@@";

/// Test data handed to the driver
///
/// Built directly as a JSON tree so rendering it cannot fail.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload(Value);

impl Payload {
    pub fn for_task(task: &Task) -> Self {
        let cases = task
            .tests
            .iter()
            .map(|case| {
                let mut entry = Map::new();
                entry.insert(
                    "description".to_string(),
                    Value::String(case.description.clone()),
                );
                entry.insert("args".to_string(), Value::Array(case.positional_args.clone()));
                entry.insert(
                    "kwargs".to_string(),
                    Value::Object(
                        case.keyword_args
                            .iter()
                            .map(|(name, value)| (name.clone(), value.clone()))
                            .collect(),
                    ),
                );
                entry.insert("expected".to_string(), case.expected_output.clone());
                Value::Object(entry)
            })
            .collect();

        let mut root = Map::new();
        root.insert("version".to_string(), Value::from(PROTOCOL_VERSION));
        root.insert(
            "target".to_string(),
            Value::String(task.target_callable_name.clone()),
        );
        root.insert("cases".to_string(), Value::Array(cases));
        Self(Value::Object(root))
    }

    /// Compact JSON text
    pub fn to_json(&self) -> String {
        self.0.to_string()
    }
}

/// Summary record written by the driver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Record {
    pub version: u32,
    pub pass_count: usize,
    pub total: usize,
    pub details: Vec<RecordDetail>,
}

/// Per-case entry of a [`Record`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordDetail {
    pub description: String,
    pub passed: bool,
    pub expected: Value,
    #[serde(default)]
    pub actual: Value,
    #[serde(default)]
    pub error: Option<String>,
}

impl Record {
    /// Render the record line the driver is expected to print
    pub fn to_line(&self) -> serde_json::Result<String> {
        Ok(format!("{} {}", RECORD_MARKER, serde_json::to_string(self)?))
    }
}
