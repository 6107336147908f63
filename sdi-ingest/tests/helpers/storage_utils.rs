//! Storage root fixtures
//!
//! Temporary storage roots populated with artifacts and metadata sheets, plus
//! a matching configuration.

use sdi_common::config::TomlConfig;
use sdi_ingest::config::{ConfigOverrides, HashAlgorithm};
use sdi_ingest::services::content_hash;
use sdi_ingest::IngestConfig;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::fake_repository::ROOT_ID;

/// Temporary storage root; dropped with the test
pub struct TestStorage {
    pub temp_dir: TempDir,
    pub config: IngestConfig,
}

impl TestStorage {
    /// Storage root with the default layout and an ingest root of [`ROOT_ID`]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        std::fs::create_dir_all(temp_dir.path().join("PDF")).unwrap();
        std::fs::create_dir_all(temp_dir.path().join("METADATA")).unwrap();
        Self { temp_dir, config }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.temp_dir.path().join(relative)
    }
}

/// Configuration rooted at `storage_root`, repository roots set to [`ROOT_ID`]
pub fn test_config(storage_root: &Path) -> IngestConfig {
    let overrides = ConfigOverrides {
        storage_root: Some(storage_root.to_path_buf()),
        base_url: Some("http://localhost:1/api/-default-/public/".to_string()),
        username: Some("admin".to_string()),
        password: Some("admin".to_string()),
        ingest_root_node: Some(ROOT_ID.to_string()),
        structure_root_node: Some(ROOT_ID.to_string()),
        log_level: None,
    };
    IngestConfig::resolve(overrides, TomlConfig::default()).unwrap()
}

/// Write `PDF/<name>` and return its path
pub fn write_artifact(root: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = root.join("PDF").join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Write `METADATA/<stem>.csv` with `contents`
pub fn write_sheet(root: &Path, stem: &str, contents: &str) -> PathBuf {
    let path = root.join("METADATA").join(format!("{}.csv", stem));
    std::fs::write(&path, contents).unwrap();
    path
}

pub fn md5_hex(bytes: &[u8]) -> String {
    content_hash(HashAlgorithm::Md5, bytes)
}

/// Contents of today's audit log for `category` (`SUCCESS` or `ERROR`)
pub fn read_log(root: &Path, category: &str, run_date: &str) -> String {
    std::fs::read_to_string(
        root.join("logs")
            .join(category)
            .join(format!("{}.log", run_date)),
    )
    .unwrap_or_default()
}
