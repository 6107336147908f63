//! sdi-ingest library interface
//!
//! Scanned-document ingestion: pairs document files with metadata sheets,
//! verifies content hashes, files documents into a remote content repository
//! under a metadata-derived folder path, tags them and routes each input to a
//! SUCCESS or ERROR area with a daily audit log.

pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod storage;

pub use crate::config::IngestConfig;
pub use crate::error::{ErrorKind, IngestError, IngestResult, RepositoryError};
pub use crate::services::{FolderStructureBuilder, IngestionOrchestrator};
pub use crate::storage::StorageLayout;
