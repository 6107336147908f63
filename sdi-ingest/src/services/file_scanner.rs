//! Input area scanner
//!
//! Enumerates artifacts and metadata sheets directly inside an input
//! directory (no recursion), filtered by extension and returned in file-name
//! order so every run processes artifacts in the same sequence.

use crate::models::{Artifact, MetadataSource};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// General I/O error
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Input directory scanner
pub struct FileScanner {
    ignore_patterns: Vec<String>,
}

impl FileScanner {
    /// Create new file scanner with default ignore patterns
    ///
    /// Hidden files and system files like Thumbs.db are ignored.
    pub fn new() -> Self {
        Self {
            ignore_patterns: vec!["Thumbs.db".to_string(), "desktop.ini".to_string()],
        }
    }

    /// Files in `dir` with `extension` (ASCII case-insensitive), sorted by name
    pub fn scan(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>, ScanError> {
        if !dir.exists() {
            return Err(ScanError::PathNotFound(dir.to_path_buf()));
        }
        if !dir.is_dir() {
            return Err(ScanError::NotADirectory(dir.to_path_buf()));
        }

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e));

        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && has_extension(entry.path(), extension) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    if e.depth() == 0 {
                        return Err(ScanError::IoError(e.to_string()));
                    }
                    tracing::warn!("Error accessing entry: {}", e);
                }
            }
        }

        tracing::debug!(dir = %dir.display(), extension, found = files.len(), "Scan complete");
        Ok(files)
    }

    /// Artifacts in `dir`
    ///
    /// Every matching file is returned, including ones whose names are not
    /// UTF-8, so that each one gets routed.
    pub fn scan_artifacts(&self, dir: &Path, extension: &str) -> Result<Vec<Artifact>, ScanError> {
        Ok(self
            .scan(dir, extension)?
            .iter()
            .map(|path| {
                let artifact = Artifact::from_path(path, extension);
                if path.file_name().and_then(|n| n.to_str()).is_none() {
                    tracing::warn!(
                        path = %path.display(),
                        artifact = %artifact.file_name,
                        "Artifact file name is not valid UTF-8"
                    );
                }
                artifact
            })
            .collect())
    }

    /// Metadata sheets in `dir`
    pub fn scan_metadata(
        &self,
        dir: &Path,
        extension: &str,
    ) -> Result<Vec<MetadataSource>, ScanError> {
        Ok(self
            .scan(dir, extension)?
            .iter()
            .filter_map(|path| {
                let source = MetadataSource::from_path(path, extension);
                if source.is_none() {
                    tracing::warn!(
                        path = %path.display(),
                        "Skipping metadata sheet whose file name is not valid UTF-8"
                    );
                }
                source
            })
            .collect())
    }

    fn should_process_entry(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }
        let file_name = entry.file_name().to_string_lossy();
        if file_name.starts_with('.') {
            return false;
        }
        !self.ignore_patterns.iter().any(|p| file_name == p.as_str())
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}
