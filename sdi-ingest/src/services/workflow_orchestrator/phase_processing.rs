//! Processing: the per-artifact pipeline
//!
//! match → read → verify → resolve → upload → tag
//!
//! Routing happens in the caller so that it runs for every outcome.

use super::IngestionOrchestrator;
use crate::error::{IngestError, IngestResult};
use crate::models::{Artifact, ArtifactProgress, ArtifactState, IngestionOutcome, MetadataRecord, MetadataSource};
use crate::services::segment_sanitizer::{PathSegment, SegmentSanitizer};
use crate::services::tagger::build_properties;

impl IngestionOrchestrator {
    /// Run every stage for `artifact`, advancing `progress` as each one passes
    pub(super) async fn phase_processing(
        &self,
        artifact: &Artifact,
        sources: &[MetadataSource],
        progress: &mut ArtifactProgress,
    ) -> IngestResult<IngestionOutcome> {
        // No match means no hashing and no repository calls
        let source = self.matcher.match_source(artifact, sources)?;
        progress.transition_to(ArtifactState::Matched);

        let record = self.matcher.load_record(source, self.reader.as_ref())?;
        let bytes = tokio::fs::read(&artifact.path)
            .await
            .map_err(|e| IngestError::Read {
                path: artifact.path.clone(),
                message: e.to_string(),
            })?;

        let digest = self.matcher.verify(&bytes, &record)?;
        progress.transition_to(ArtifactState::Verified);
        tracing::debug!(artifact = %artifact.file_name, digest = %digest, "Content hash verified");

        let segments = folder_segments(
            &record,
            self.matcher.hash_field(),
            &self.folder_fields,
            &self.excluded_fields,
            &self.sanitizer,
        )?;
        let folder = self.resolver.resolve(&self.ingest_root, &segments).await?;
        progress.transition_to(ArtifactState::Resolved);

        let node = self
            .uploader
            .upload(&folder, bytes, &artifact.file_name)
            .await?;
        progress.transition_to(ArtifactState::Uploaded);

        let properties = build_properties(&record, &self.tagging.properties);
        self.tagger
            .tag(&node.id, &self.tagging.aspect, &properties)
            .await?;
        progress.transition_to(ArtifactState::Tagged);

        Ok(IngestionOutcome::Success {
            remote_id: node.id,
            remote_path: node.path,
        })
    }
}

/// Folder path segments for a metadata record
///
/// With `folder_fields` configured, those fields are used in that order and
/// each must be present and non-blank. Otherwise every column in sheet order
/// is used except the hash field and `excluded_fields`; blank cells are
/// skipped.
pub fn folder_segments(
    record: &MetadataRecord,
    hash_field: &str,
    folder_fields: &[String],
    excluded_fields: &[String],
    sanitizer: &SegmentSanitizer,
) -> IngestResult<Vec<PathSegment>> {
    if !folder_fields.is_empty() {
        return folder_fields
            .iter()
            .map(|field| {
                let value = record.get(field).ok_or_else(|| {
                    IngestError::Configuration(format!(
                        "metadata record has no '{}' field",
                        field
                    ))
                })?;
                sanitizer.sanitize(value)
            })
            .collect();
    }

    sanitizer.sanitize_all(
        record
            .iter()
            .filter(|(name, _)| *name != hash_field)
            .filter(|(name, _)| !excluded_fields.iter().any(|e| e.as_str() == *name))
            .map(|(_, value)| value)
            .filter(|value| !value.trim().is_empty()),
    )
}
