//! Scanning: artifact and metadata sheet discovery
//!
//! Also backs the dry-run preview, which pairs artifacts with sheets without
//! creating directories, touching the repository or moving files.

use super::IngestionOrchestrator;
use crate::models::{Artifact, MetadataSource};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Pairing of one artifact as seen by a dry run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingPreview {
    pub artifact: String,
    /// Matched metadata sheet, None when the artifact would be NO_MATCH
    pub metadata_sheet: Option<String>,
}

impl IngestionOrchestrator {
    /// Enumerate artifacts and metadata sheets in the input area
    pub(super) fn phase_scanning(&self) -> Result<(Vec<Artifact>, Vec<MetadataSource>)> {
        let artifacts = self
            .scanner
            .scan_artifacts(self.layout.artifact_dir(), self.layout.artifact_extension())
            .with_context(|| {
                format!(
                    "Failed to scan artifacts in {}",
                    self.layout.artifact_dir().display()
                )
            })?;

        let sources = self
            .scanner
            .scan_metadata(self.layout.metadata_dir(), self.layout.metadata_extension())
            .with_context(|| {
                format!(
                    "Failed to scan metadata sheets in {}",
                    self.layout.metadata_dir().display()
                )
            })?;

        Ok((artifacts, sources))
    }

    /// List discovered artifacts and their metadata pairing, mutating nothing
    pub fn dry_run_scan(&self) -> Result<Vec<PairingPreview>> {
        let (artifacts, sources) = self.phase_scanning()?;

        Ok(artifacts
            .iter()
            .map(|artifact| PairingPreview {
                artifact: artifact.file_name.clone(),
                metadata_sheet: self
                    .matcher
                    .match_source(artifact, &sources)
                    .ok()
                    .map(|source| source.file_name.clone()),
            })
            .collect())
    }
}
