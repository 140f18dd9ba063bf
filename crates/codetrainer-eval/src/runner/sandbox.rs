//! Throwaway working directory for one execution
//!
//! Every execution gets its own uniquely named temporary directory holding
//! only the synthesized program. The directory is removed when the sandbox is
//! cleaned up or dropped, whichever comes first.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;
use tokio::fs;

const DIR_PREFIX: &str = "codetrainer-";

/// Temporary, caller-writable execution directory
pub struct Sandbox {
    /// Owned temporary directory, removed on drop
    temp_dir: Option<TempDir>,

    /// Path to the sandbox root
    root: PathBuf,
}

impl Sandbox {
    /// Create a new sandbox under the system temp directory
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix(DIR_PREFIX)
            .tempdir()
            .context("Failed to create temporary directory")?;
        let root = temp_dir.path().to_path_buf();

        tracing::debug!("Created sandbox at {:?}", root);

        Ok(Self {
            temp_dir: Some(temp_dir),
            root,
        })
    }

    /// Get the root path of the sandbox
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a file at the sandbox root and return its full path
    pub async fn write_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let full_path = self.root.join(name);
        fs::write(&full_path, content)
            .await
            .with_context(|| format!("Failed to write file: {:?}", full_path))?;

        tracing::debug!(bytes = content.len(), "Wrote {:?}", full_path);
        Ok(full_path)
    }

    /// Remove the sandbox directory
    pub fn cleanup(mut self) -> Result<()> {
        if let Some(temp_dir) = self.temp_dir.take() {
            temp_dir
                .close()
                .with_context(|| format!("Failed to remove sandbox {:?}", self.root))?;
            tracing::debug!("Cleaned up sandbox {:?}", self.root);
        }
        Ok(())
    }
}
