//! # SDI Common Library
//!
//! Shared code for the scanned-document ingest tools:
//! - Common error type
//! - TOML configuration model and loading
//! - Storage root resolution
//! - Timestamp helpers for audit logs

pub mod config;
pub mod error;
pub mod time;

pub use error::{Error, Result};
