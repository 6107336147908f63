//! Test Helper Utilities
//!
//! Shared utilities for testing sdi-ingest

#![allow(dead_code)]

pub mod fake_repository;
pub mod storage_utils;

// Re-export commonly used items
pub use fake_repository::{InMemoryRepository, RepositoryCall};
pub use storage_utils::{
    md5_hex, read_log, test_config, write_artifact, write_sheet, TestStorage,
};
