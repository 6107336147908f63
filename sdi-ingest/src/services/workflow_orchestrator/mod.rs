//! Ingestion workflow orchestrator
//!
//! Drives every discovered artifact through the pipeline, strictly one at a
//! time and in file-name order:
//!
//! DISCOVERED → MATCHED → VERIFIED → RESOLVED → UPLOADED → TAGGED → ROUTED
//!
//! A stage error ends processing of the current artifact only. The artifact
//! is then routed to ERROR with the error kind recorded, and the run moves on.
//! Every artifact is routed exactly once.
//!
//! - Scanning and the dry-run pairing preview: `phase_scanning`
//! - Per-artifact pipeline: `phase_processing`

use crate::config::IngestConfig;
use crate::models::{ArtifactProgress, ArtifactReport, ArtifactState, IngestionOutcome, RunSummary};
use crate::repository::{ContentRepository, FolderHandle};
use crate::services::{
    FileScanner, FolderPathResolver, IntegrityMatcher, MetadataTagger, OutcomeRouter,
    RepositoryUploader, SegmentSanitizer, TabularReader,
};
use crate::storage::StorageLayout;
use anyhow::{Context, Result};
use sdi_common::config::TaggingConfig;
use std::sync::Arc;

mod phase_processing;
mod phase_scanning;

pub use phase_scanning::PairingPreview;

/// Ingestion workflow orchestrator
pub struct IngestionOrchestrator {
    layout: StorageLayout,
    ingest_root: FolderHandle,
    scanner: FileScanner,
    reader: Arc<dyn TabularReader>,
    matcher: IntegrityMatcher,
    sanitizer: SegmentSanitizer,
    resolver: FolderPathResolver,
    uploader: RepositoryUploader,
    tagger: MetadataTagger,
    folder_fields: Vec<String>,
    excluded_fields: Vec<String>,
    tagging: TaggingConfig,
}

impl IngestionOrchestrator {
    /// Create the orchestrator for one configuration
    ///
    /// # Arguments
    /// * `config` - Resolved runtime configuration (must name an ingest root)
    /// * `repository` - Remote content repository
    /// * `reader` - Metadata sheet reader
    pub fn new(
        config: &IngestConfig,
        repository: Arc<dyn ContentRepository>,
        reader: Arc<dyn TabularReader>,
    ) -> sdi_common::Result<Self> {
        let ingest_root = config.ingest_root()?.clone();

        Ok(Self {
            layout: StorageLayout::new(&config.storage_root, &config.layout),
            ingest_root,
            scanner: FileScanner::new(),
            reader,
            matcher: IntegrityMatcher::new(config.hash_field.clone(), config.hash_algorithm),
            sanitizer: SegmentSanitizer::new(&config.disallowed_chars),
            resolver: FolderPathResolver::new(
                Arc::clone(&repository),
                config.repository.page_size,
            ),
            uploader: RepositoryUploader::new(Arc::clone(&repository)),
            tagger: MetadataTagger::new(repository),
            folder_fields: config.folder_fields.clone(),
            excluded_fields: config.excluded_fields.clone(),
            tagging: config.tagging.clone(),
        })
    }

    /// Perform one ingestion run
    ///
    /// Returns Err only when the run cannot start (storage directories cannot
    /// be created or scanned). Artifact-level failures are outcomes recorded
    /// in the summary.
    pub async fn run(&self) -> Result<RunSummary> {
        let started_at = sdi_common::time::now();
        let run_date = sdi_common::time::log_date(started_at);
        let start_time = std::time::Instant::now();
        let mut summary = RunSummary::new(run_date.clone(), started_at);

        self.layout
            .ensure_directories()
            .await
            .with_context(|| {
                format!(
                    "Failed to create storage directories under {}",
                    self.layout.root().display()
                )
            })?;

        let (artifacts, sources) = self.phase_scanning()?;

        tracing::info!(
            run_id = %summary.run_id,
            run_date = %run_date,
            artifacts = artifacts.len(),
            metadata_sheets = sources.len(),
            "Starting ingestion run"
        );

        let router = OutcomeRouter::new(self.layout.clone(), run_date);

        for artifact in &artifacts {
            let mut progress = ArtifactProgress::new(artifact.file_name.clone());

            let outcome = match self.phase_processing(artifact, &sources, &mut progress).await {
                Ok(outcome) => {
                    tracing::info!(artifact = %artifact.file_name, "Artifact ingested");
                    outcome
                }
                Err(e) => {
                    tracing::warn!(
                        artifact = %artifact.file_name,
                        state = ?progress.state,
                        kind = %e.kind(),
                        error = %e,
                        "Artifact routed to ERROR"
                    );
                    IngestionOutcome::Failed(e)
                }
            };

            let route = router.route(artifact, &outcome).await;
            progress.transition_to(ArtifactState::Routed);

            summary.record(ArtifactReport::from_outcome(
                &artifact.file_name,
                &outcome,
                route.relocated(),
            ));
        }

        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        tracing::info!(
            run_id = %summary.run_id,
            total = summary.total_artifacts,
            succeeded = summary.succeeded,
            failed = summary.failed,
            relocation_failures = summary.relocation_failures,
            duration_ms = summary.duration_ms,
            "Ingestion run complete"
        );

        Ok(summary)
    }
}
