//! Error types for sdi-ingest
//!
//! Every pipeline stage surfaces a typed [`IngestError`]. The orchestrator
//! turns stage errors into an ERROR outcome for the current artifact only;
//! none of them abort the run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Content repository transport errors
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("HTTP client build error: {0}")]
    Build(String),
}

/// Error category recorded in the audit log and run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// No metadata sheet shares the artifact's stem
    NoMatch,
    /// Computed content hash differs from the recorded one
    HashMismatch,
    /// Folder listing or creation failed
    Resolution,
    /// Content upload failed
    Upload,
    /// Aspect/property update failed
    Tag,
    /// Local move to the outcome area failed (non-fatal)
    Relocation,
    /// Missing fields or unusable values
    Configuration,
    /// Artifact or metadata sheet could not be read
    Read,
    /// Audit log append failed
    AuditLog,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoMatch => "NO_MATCH",
            Self::HashMismatch => "HASH_MISMATCH",
            Self::Resolution => "RESOLUTION",
            Self::Upload => "UPLOAD",
            Self::Tag => "TAG",
            Self::Relocation => "RELOCATION",
            Self::Configuration => "CONFIGURATION",
            Self::Read => "READ",
            Self::AuditLog => "AUDIT_LOG",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline stage errors
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("No metadata sheet matches artifact {artifact}")]
    NoMatch { artifact: String },

    #[error("Hash mismatch: expected {expected}, computed {actual}")]
    Mismatch { expected: String, actual: String },

    #[error("Folder resolution failed at segment '{segment}': {source}")]
    Resolution {
        segment: String,
        #[source]
        source: RepositoryError,
    },

    #[error("Upload of {filename} failed: {source}")]
    Upload {
        filename: String,
        #[source]
        source: RepositoryError,
    },

    #[error("Tagging node {node_id} failed: {source}")]
    Tag {
        node_id: String,
        #[source]
        source: RepositoryError,
    },

    #[error("Relocating {} failed: {source}", path.display())]
    Relocation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Reading {} failed: {message}", path.display())]
    Read { path: PathBuf, message: String },

    #[error("Appending audit log {} failed: {source}", path.display())]
    AuditLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IngestError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoMatch { .. } => ErrorKind::NoMatch,
            Self::Mismatch { .. } => ErrorKind::HashMismatch,
            Self::Resolution { .. } => ErrorKind::Resolution,
            Self::Upload { .. } => ErrorKind::Upload,
            Self::Tag { .. } => ErrorKind::Tag,
            Self::Relocation { .. } => ErrorKind::Relocation,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Read { .. } => ErrorKind::Read,
            Self::AuditLog { .. } => ErrorKind::AuditLog,
        }
    }
}

/// Result type for pipeline stages
pub type IngestResult<T> = Result<T, IngestError>;
