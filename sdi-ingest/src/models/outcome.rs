//! Ingestion outcomes and run summary

use crate::error::{ErrorKind, IngestError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Terminal classification of one artifact in one run
#[derive(Debug)]
pub enum IngestionOutcome {
    /// Uploaded and tagged
    Success { remote_id: String, remote_path: String },
    /// Stopped at some stage
    Failed(IngestError),
}

/// Outcome area an artifact is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutcomeCategory {
    Success,
    Error,
}

impl OutcomeCategory {
    /// Directory name used under `RESULT/` and `logs/`
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
        }
    }
}

impl IngestionOutcome {
    pub fn category(&self) -> OutcomeCategory {
        match self {
            Self::Success { .. } => OutcomeCategory::Success,
            Self::Failed(_) => OutcomeCategory::Error,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failed(err) => Some(err.kind()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Per-artifact line of the run summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactReport {
    pub artifact: String,
    pub category: OutcomeCategory,
    pub error_kind: Option<ErrorKind>,
    /// Human-readable reason for errors, empty on success
    pub reason: String,
    pub remote_id: Option<String>,
    pub remote_path: Option<String>,
    /// False when the move to the outcome area failed
    pub relocated: bool,
}

impl ArtifactReport {
    pub fn from_outcome(artifact: &str, outcome: &IngestionOutcome, relocated: bool) -> Self {
        match outcome {
            IngestionOutcome::Success {
                remote_id,
                remote_path,
            } => Self {
                artifact: artifact.to_string(),
                category: OutcomeCategory::Success,
                error_kind: None,
                reason: String::new(),
                remote_id: Some(remote_id.clone()),
                remote_path: Some(remote_path.clone()),
                relocated,
            },
            IngestionOutcome::Failed(err) => Self {
                artifact: artifact.to_string(),
                category: OutcomeCategory::Error,
                error_kind: Some(err.kind()),
                reason: err.to_string(),
                remote_id: None,
                remote_path: None,
                relocated,
            },
        }
    }
}

/// Result of one ingestion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    /// Calendar date naming this run's audit log files
    pub run_date: String,
    pub started_at: DateTime<Utc>,
    pub total_artifacts: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Error outcomes per kind
    pub errors_by_kind: BTreeMap<ErrorKind, usize>,
    /// Artifacts whose move to the outcome area failed
    pub relocation_failures: usize,
    pub artifacts: Vec<ArtifactReport>,
    pub duration_ms: u64,
}

impl RunSummary {
    pub fn new(run_date: String, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            run_date,
            started_at,
            total_artifacts: 0,
            succeeded: 0,
            failed: 0,
            errors_by_kind: BTreeMap::new(),
            relocation_failures: 0,
            artifacts: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Account for one routed artifact
    pub fn record(&mut self, report: ArtifactReport) {
        self.total_artifacts += 1;
        match report.error_kind {
            None => self.succeeded += 1,
            Some(kind) => {
                self.failed += 1;
                *self.errors_by_kind.entry(kind).or_insert(0) += 1;
            }
        }
        if !report.relocated {
            self.relocation_failures += 1;
        }
        self.artifacts.push(report);
    }

    /// Report for `artifact`, if it was processed in this run
    pub fn report_for(&self, artifact: &str) -> Option<&ArtifactReport> {
        self.artifacts.iter().find(|r| r.artifact == artifact)
    }
}
