//! Outcome routing: audit log append and artifact relocation
//!
//! Every artifact ends a run in exactly one outcome area. The router appends
//! one entry to that day's audit log for the category and then moves the
//! artifact file from the input area into `RESULT/<CATEGORY>/`.
//!
//! Audit log entries have the form:
//!
//! ```text
//! [2024-03-01T09:15:02.114Z]: report.pdf
//! 	remote id: 7f3c...
//! 	remote path: /Company Home/Scans/Finance/2024/Q1/report.pdf
//!
//! ```

use crate::error::{IngestError, IngestResult};
use crate::models::{Artifact, IngestionOutcome, OutcomeCategory};
use crate::storage::StorageLayout;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// One timestamped audit log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogEntry {
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub fields: Vec<(String, String)>,
}

impl AuditLogEntry {
    /// Entry describing `outcome` for the artifact called `name`
    pub fn for_outcome(timestamp: DateTime<Utc>, name: &str, outcome: &IngestionOutcome) -> Self {
        let fields = match outcome {
            IngestionOutcome::Success {
                remote_id,
                remote_path,
            } => vec![
                ("remote id".to_string(), remote_id.clone()),
                ("remote path".to_string(), remote_path.clone()),
            ],
            IngestionOutcome::Failed(err) => vec![
                ("kind".to_string(), err.kind().to_string()),
                ("reason".to_string(), err.to_string()),
            ],
        };

        Self {
            timestamp,
            name: name.to_string(),
            fields,
        }
    }

    /// Text appended to the log file
    ///
    /// Line breaks inside values are flattened so one entry stays one
    /// line-group.
    pub fn render(&self) -> String {
        let mut out = format!(
            "[{}]: {}\n",
            sdi_common::time::audit_timestamp(self.timestamp),
            self.name
        );
        for (field, value) in &self.fields {
            out.push_str(&format!("\t{}: {}\n", field, flatten(value)));
        }
        out.push('\n');
        out
    }
}

fn flatten(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// Append-only audit log, one file per category and run date
#[derive(Debug, Clone)]
pub struct AuditLog {
    layout: StorageLayout,
    run_date: String,
}

impl AuditLog {
    pub fn new(layout: StorageLayout, run_date: impl Into<String>) -> Self {
        Self {
            layout,
            run_date: run_date.into(),
        }
    }

    /// `logs/<CATEGORY>/<run_date>.log`
    pub fn path_for(&self, category: OutcomeCategory) -> PathBuf {
        self.layout
            .log_dir(category)
            .join(format!("{}.log", self.run_date))
    }

    /// Append `entry` to the category's log file, creating it if needed
    pub async fn append(
        &self,
        category: OutcomeCategory,
        entry: &AuditLogEntry,
    ) -> IngestResult<()> {
        let path = self.path_for(category);
        let audit_error = |source| IngestError::AuditLog {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(audit_error)?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(audit_error)?;

        file.write_all(entry.render().as_bytes())
            .await
            .map_err(audit_error)?;
        file.flush().await.map_err(audit_error)?;

        Ok(())
    }
}

/// What routing did for one artifact
#[derive(Debug)]
pub struct RouteReport {
    pub category: OutcomeCategory,
    /// Final location of the artifact file when the move succeeded
    pub destination: Option<PathBuf>,
    /// Audit log or relocation failures; never change the outcome
    pub errors: Vec<IngestError>,
}

impl RouteReport {
    pub fn relocated(&self) -> bool {
        self.destination.is_some()
    }
}

/// Logs outcomes and moves artifacts into their outcome area
pub struct OutcomeRouter {
    layout: StorageLayout,
    audit_log: AuditLog,
}

impl OutcomeRouter {
    /// `run_date` is fixed for the whole run, even across midnight
    pub fn new(layout: StorageLayout, run_date: impl Into<String>) -> Self {
        let audit_log = AuditLog::new(layout.clone(), run_date);
        Self { layout, audit_log }
    }

    /// Append the audit entry, then relocate the artifact
    ///
    /// Neither failure aborts the run: both are reported to the diagnostic
    /// log and returned in the report. A failed log append does not skip the
    /// move.
    pub async fn route(&self, artifact: &Artifact, outcome: &IngestionOutcome) -> RouteReport {
        let category = outcome.category();
        let mut errors = Vec::new();

        let entry = AuditLogEntry::for_outcome(sdi_common::time::now(), &artifact.file_name, outcome);
        if let Err(e) = self.audit_log.append(category, &entry).await {
            tracing::error!(artifact = %artifact.file_name, error = %e, "Audit log append failed");
            errors.push(e);
        }

        let destination = match self.relocate(artifact, category).await {
            Ok(path) => {
                tracing::debug!(
                    artifact = %artifact.file_name,
                    destination = %path.display(),
                    "Artifact relocated"
                );
                Some(path)
            }
            Err(e) => {
                tracing::error!(artifact = %artifact.file_name, error = %e, "Relocation failed");
                errors.push(e);
                None
            }
        };

        RouteReport {
            category,
            destination,
            errors,
        }
    }

    /// Move the artifact to `RESULT/<CATEGORY>/<name>` under its on-disk name
    ///
    /// An earlier result with the same name is replaced.
    async fn relocate(
        &self,
        artifact: &Artifact,
        category: OutcomeCategory,
    ) -> IngestResult<PathBuf> {
        let target = match artifact.path.file_name() {
            Some(name) => self.layout.result_dir(category).join(name),
            None => self.layout.result_dir(category).join(&artifact.file_name),
        };
        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            tracing::warn!(
                artifact = %artifact.file_name,
                destination = %target.display(),
                "Replacing earlier result with the same name"
            );
        }
        tokio::fs::rename(&artifact.path, &target)
            .await
            .map_err(|source| IngestError::Relocation {
                path: artifact.path.clone(),
                source,
            })?;
        Ok(target)
    }
}
