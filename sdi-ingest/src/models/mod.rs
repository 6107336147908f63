//! Data models for sdi-ingest
//!
//! - Artifacts, metadata sheets and records
//! - Per-artifact state machine
//! - Outcomes and run summary

pub mod artifact;
pub mod artifact_state;
pub mod outcome;

pub use artifact::{Artifact, MetadataRecord, MetadataSource};
pub use artifact_state::{ArtifactProgress, ArtifactState, StateTransition};
pub use outcome::{ArtifactReport, IngestionOutcome, OutcomeCategory, RunSummary};
