//! Task loading from YAML/JSON files
//!
//! Loads exercise definitions from a catalog directory. A file holds either a
//! single task or a list of tasks.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use super::Task;
use crate::error::{EvalError, EvalResult};

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Many(Vec<Task>),
    One(Box<Task>),
}

impl CatalogFile {
    fn into_tasks(self) -> Vec<Task> {
        match self {
            CatalogFile::Many(tasks) => tasks,
            CatalogFile::One(task) => vec![*task],
        }
    }
}

/// Loader for exercise catalogs
pub struct TaskLoader {
    /// Base directory for catalog files
    tasks_dir: PathBuf,
}

impl TaskLoader {
    /// Create a new task loader with the given catalog directory
    pub fn new(tasks_dir: impl AsRef<Path>) -> Self {
        Self {
            tasks_dir: tasks_dir.as_ref().to_path_buf(),
        }
    }

    /// Load every valid task below the catalog directory.
    ///
    /// Files that fail to parse and tasks that fail validation are skipped
    /// with a warning so one bad entry does not take the catalog down.
    /// Files are visited in path order; tasks keep their in-file order.
    pub fn load_all(&self) -> EvalResult<Vec<Task>> {
        if !self.tasks_dir.is_dir() {
            return Err(EvalError::catalog(
                &self.tasks_dir,
                "catalog directory does not exist",
            ));
        }

        let mut tasks = Vec::new();

        for entry in WalkDir::new(&self.tasks_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !Self::is_task_file(path) {
                continue;
            }

            match Self::load_task_file(path) {
                Ok(loaded) => {
                    for task in loaded {
                        match task.validate() {
                            Ok(()) => tasks.push(task),
                            Err(e) => tracing::warn!("Skipping task from {:?}: {}", path, e),
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to load tasks from {:?}: {}", path, e);
                }
            }
        }

        tracing::debug!(count = tasks.len(), dir = ?self.tasks_dir, "Loaded task catalog");
        Ok(tasks)
    }

    /// Load the tasks in one catalog file
    pub fn load_task_file(path: &Path) -> EvalResult<Vec<Task>> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EvalError::catalog(path, format!("failed to read file: {}", e)))?;

        let parsed: CatalogFile = if path
            .extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml")
        {
            serde_yaml::from_str(&content)
                .map_err(|e| EvalError::catalog(path, format!("invalid YAML: {}", e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| EvalError::catalog(path, format!("invalid JSON: {}", e)))?
        };

        Ok(parsed.into_tasks())
    }

    /// Check if a path is a catalog file
    fn is_task_file(path: &Path) -> bool {
        if !path.is_file() {
            return false;
        }

        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml") | Some("json")
        )
    }
}

/// Load tasks from a YAML string holding a list of tasks
pub fn load_tasks_from_yaml(yaml: &str) -> Result<Vec<Task>, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}
