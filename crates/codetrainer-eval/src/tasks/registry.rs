//! Immutable exercise catalog
//!
//! Built once at startup and handed to callers by reference.

use std::collections::HashMap;

use super::Task;
use super::loader::load_tasks_from_yaml;
use crate::error::{EvalError, EvalResult};

const BUILTIN_CATALOG: &str = include_str!("../../tasks/builtin.yaml");

/// Read-only registry of exercises, in catalog order
#[derive(Debug, Clone)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
}

impl TaskRegistry {
    /// Build a registry, rejecting invalid tasks and duplicate ids
    pub fn new(tasks: Vec<Task>) -> EvalResult<Self> {
        let mut index = HashMap::with_capacity(tasks.len());

        for (position, task) in tasks.iter().enumerate() {
            task.validate()?;
            if index.insert(task.id.clone(), position).is_some() {
                return Err(EvalError::DuplicateTask(task.id.clone()));
            }
        }

        Ok(Self { tasks, index })
    }

    /// The tasks shipped with the crate
    pub fn builtin_tasks() -> EvalResult<Vec<Task>> {
        load_tasks_from_yaml(BUILTIN_CATALOG)
            .map_err(|e| EvalError::catalog("<builtin>", e.to_string()))
    }

    /// Registry of the built-in tasks
    pub fn builtin() -> EvalResult<Self> {
        Self::new(Self::builtin_tasks()?)
    }

    /// Look up a task by id
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.index.get(id).map(|&position| &self.tasks[position])
    }

    /// Iterate over tasks in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// List task ids in catalog order
    pub fn ids(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.id.as_str()).collect()
    }

    /// Number of tasks in the catalog
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the catalog holds no tasks
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
