//! Task definitions and the exercise catalog
//!
//! This module provides the test case model, value equality, and catalog loading.

mod loader;
mod registry;
mod task;
mod value;

pub use loader::{TaskLoader, load_tasks_from_yaml};
pub use registry::TaskRegistry;
pub use task::{Task, TestCase};
pub use value::{Value, values_equal};
