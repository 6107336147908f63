//! Ingestion pipeline services
//!
//! Leaves first: sanitizer and reader, then resolver, matcher, uploader,
//! tagger and router, with the orchestrator and structure builders on top.

pub mod file_scanner;
pub mod folder_resolver;
pub mod folder_structure;
pub mod integrity_matcher;
pub mod metadata_reader;
pub mod outcome_router;
pub mod segment_sanitizer;
pub mod tagger;
pub mod uploader;
pub mod workflow_orchestrator;

pub use file_scanner::{FileScanner, ScanError};
pub use folder_resolver::{display_path, FolderPathResolver, DEFAULT_PAGE_SIZE};
pub use folder_structure::{FolderStructureBuilder, RowFailure, StructureSummary};
pub use integrity_matcher::{content_hash, IntegrityMatcher};
pub use metadata_reader::{CsvTabularReader, TabularReader};
pub use outcome_router::{AuditLog, AuditLogEntry, OutcomeRouter, RouteReport};
pub use segment_sanitizer::{PathSegment, SegmentSanitizer};
pub use tagger::{build_properties, merge_aspects, MetadataTagger};
pub use uploader::RepositoryUploader;
pub use workflow_orchestrator::{IngestionOrchestrator, PairingPreview};
