//! Folder-structure builders
//!
//! Pre-create folder hierarchies under the structure root from a sheet,
//! without ingesting any documents:
//!
//! - **folders**: header-less sheet, each row's non-empty cells are one path
//! - **matrix**: header sheet, each record's columns (minus excluded ones)
//!   are one path in column order
//!
//! Both reuse [`FolderPathResolver`], so re-running a sheet creates nothing new.

use crate::config::IngestConfig;
use crate::error::IngestResult;
use crate::repository::{ContentRepository, FolderHandle};
use crate::services::folder_resolver::{display_path, FolderPathResolver};
use crate::services::metadata_reader::TabularReader;
use crate::services::segment_sanitizer::SegmentSanitizer;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// A sheet row that could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    /// 1-based line number in the sheet
    pub line: usize,
    pub message: String,
}

/// Result of one builder run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureSummary {
    pub rows: usize,
    pub resolved: usize,
    /// Rows yielding no segments
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<RowFailure>,
}

/// Builds folder hierarchies from sheets
pub struct FolderStructureBuilder {
    root: FolderHandle,
    resolver: FolderPathResolver,
    sanitizer: SegmentSanitizer,
    reader: Arc<dyn TabularReader>,
    excluded_fields: Vec<String>,
}

impl FolderStructureBuilder {
    /// Builder rooted at the configured structure root
    pub fn new(
        config: &IngestConfig,
        repository: Arc<dyn ContentRepository>,
        reader: Arc<dyn TabularReader>,
    ) -> sdi_common::Result<Self> {
        Ok(Self {
            root: config.structure_root()?.clone(),
            resolver: FolderPathResolver::new(repository, config.repository.page_size),
            sanitizer: SegmentSanitizer::new(&config.disallowed_chars),
            reader,
            excluded_fields: config.excluded_fields.clone(),
        })
    }

    /// One path per header-less row
    pub async fn build_folders(&self, sheet: &Path) -> IngestResult<StructureSummary> {
        let rows = self.reader.read_rows(sheet)?;
        let lines = rows.into_iter().enumerate().map(|(i, cells)| (i + 1, cells));

        tracing::info!(sheet = %sheet.display(), root = %self.root, "Building folder structure");
        Ok(self.resolve_rows(lines).await)
    }

    /// One path per record, excluded columns removed
    pub async fn build_matrix(&self, sheet: &Path) -> IngestResult<StructureSummary> {
        let records = self.reader.read_records(sheet)?;
        let lines = records.into_iter().enumerate().map(|(i, record)| {
            let cells = record
                .iter()
                .filter(|(name, _)| !self.excluded_fields.iter().any(|e| e.as_str() == *name))
                .map(|(_, value)| value.to_string())
                .collect::<Vec<_>>();
            // Line 1 is the header
            (i + 2, cells)
        });

        tracing::info!(sheet = %sheet.display(), root = %self.root, "Building folder matrix");
        Ok(self.resolve_rows(lines).await)
    }

    async fn resolve_rows<I>(&self, rows: I) -> StructureSummary
    where
        I: IntoIterator<Item = (usize, Vec<String>)>,
    {
        let mut summary = StructureSummary::default();

        for (line, cells) in rows {
            summary.rows += 1;

            let non_empty = cells.iter().filter(|c| !c.trim().is_empty());
            let segments = match self.sanitizer.sanitize_all(non_empty) {
                Ok(segments) => segments,
                Err(e) => {
                    tracing::warn!(line, error = %e, "Row skipped: unusable folder name");
                    summary.failed += 1;
                    summary.failures.push(RowFailure {
                        line,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            if segments.is_empty() {
                summary.skipped += 1;
                continue;
            }

            match self.resolver.resolve(&self.root, &segments).await {
                Ok(handle) => {
                    tracing::debug!(line, path = %display_path(&segments), folder = %handle, "Row resolved");
                    summary.resolved += 1;
                }
                Err(e) => {
                    tracing::error!(line, path = %display_path(&segments), error = %e, "Row failed");
                    summary.failed += 1;
                    summary.failures.push(RowFailure {
                        line,
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            rows = summary.rows,
            resolved = summary.resolved,
            skipped = summary.skipped,
            failed = summary.failed,
            "Folder structure complete"
        );
        summary
    }
}
