//! Local storage layout
//!
//! ```text
//! <storage_root>/
//! ├── PDF/                 artifacts awaiting ingestion
//! ├── METADATA/            metadata sheets
//! ├── RESULT/SUCCESS/      relocated artifacts
//! ├── RESULT/ERROR/
//! └── logs/SUCCESS/<date>.log, logs/ERROR/<date>.log
//! ```

use crate::models::OutcomeCategory;
use sdi_common::config::LayoutConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
    artifact_dir: PathBuf,
    metadata_dir: PathBuf,
    artifact_extension: String,
    metadata_extension: String,
}

impl StorageLayout {
    pub fn new(root: &Path, layout: &LayoutConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            artifact_dir: root.join(&layout.artifact_dir),
            metadata_dir: root.join(&layout.metadata_dir),
            artifact_extension: layout.artifact_extension.trim_start_matches('.').to_string(),
            metadata_extension: layout.metadata_extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn artifact_dir(&self) -> &Path {
        &self.artifact_dir
    }

    pub fn metadata_dir(&self) -> &Path {
        &self.metadata_dir
    }

    pub fn artifact_extension(&self) -> &str {
        &self.artifact_extension
    }

    pub fn metadata_extension(&self) -> &str {
        &self.metadata_extension
    }

    /// `RESULT/<CATEGORY>`
    pub fn result_dir(&self, category: OutcomeCategory) -> PathBuf {
        self.root.join("RESULT").join(category.dir_name())
    }

    /// `logs/<CATEGORY>`
    pub fn log_dir(&self, category: OutcomeCategory) -> PathBuf {
        self.root.join("logs").join(category.dir_name())
    }

    /// Create every input, result and log directory that is missing
    pub async fn ensure_directories(&self) -> std::io::Result<()> {
        let mut dirs = vec![self.artifact_dir.clone(), self.metadata_dir.clone()];
        for category in [OutcomeCategory::Success, OutcomeCategory::Error] {
            dirs.push(self.result_dir(category));
            dirs.push(self.log_dir(category));
        }
        for dir in dirs {
            tokio::fs::create_dir_all(&dir).await?;
        }
        Ok(())
    }
}
