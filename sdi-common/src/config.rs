//! Configuration file model and storage root resolution
//!
//! Resolution priority for every setting is:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! This module owns levels 3 and 4. Levels 1 and 2 are layered on top by the
//! binary when it builds its immutable runtime configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable that points at an explicit TOML config file
pub const CONFIG_PATH_ENV: &str = "SDI_CONFIG";

/// Top-level TOML configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Local storage root holding input, result and log directories
    pub storage_root: Option<PathBuf>,
    /// Diagnostic logging settings
    pub logging: LoggingConfig,
    /// Remote content repository connection
    pub repository: RepositoryConfig,
    /// Directory names and file extensions under the storage root
    pub layout: LayoutConfig,
    /// Matching, verification and folder-path settings
    pub ingest: IngestSettings,
    /// Aspect and property mapping applied to uploaded content
    pub tagging: TaggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Content repository connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Base service URL, e.g. `https://dms.example.com/api/-default-/public/`
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Folder node under which ingested documents are filed
    pub ingest_root_node: Option<String>,
    /// Folder node under which the structure builders create hierarchies
    pub structure_root_node: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Children listed per page when resolving folders
    pub page_size: u32,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            username: None,
            password: None,
            ingest_root_node: None,
            structure_root_node: None,
            timeout_secs: 30,
            page_size: 1000,
        }
    }
}

/// Storage layout under the storage root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub artifact_dir: String,
    pub metadata_dir: String,
    pub artifact_extension: String,
    pub metadata_extension: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            artifact_dir: "PDF".to_string(),
            metadata_dir: "METADATA".to_string(),
            artifact_extension: "pdf".to_string(),
            metadata_extension: "csv".to_string(),
        }
    }
}

/// Matching, verification and folder-path settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Metadata column holding the expected content hash
    pub hash_field: String,
    /// `md5` or `sha256`
    pub hash_algorithm: String,
    /// Ordered columns forming the folder path (empty = all remaining columns)
    pub folder_fields: Vec<String>,
    /// Columns never used as path segments
    pub excluded_fields: Vec<String>,
    /// Characters replaced by a hyphen in path segments, on top of `/` and `|`
    pub disallowed_chars: String,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            hash_field: "MD5 Code".to_string(),
            hash_algorithm: "md5".to_string(),
            folder_fields: Vec::new(),
            excluded_fields: vec!["Custom Metadata".to_string()],
            disallowed_chars: String::new(),
        }
    }
}

/// Tagging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggingConfig {
    /// Aspect added to every uploaded document
    pub aspect: String,
    /// Metadata column -> repository property name
    pub properties: BTreeMap<String, String>,
}

impl Default for TaggingConfig {
    fn default() -> Self {
        let mut properties = BTreeMap::new();
        properties.insert("MD5 Code".to_string(), "sdi:md5Code".to_string());
        Self {
            aspect: "sdi:scannedDocument".to_string(),
            properties,
        }
    }
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Locate and load the config file
///
/// An explicit path (argument, then `SDI_CONFIG`) must exist. Without one the
/// per-user default location is tried, and a missing file falls back to
/// compiled defaults with a warning.
pub fn load_config_file(explicit: Option<&Path>) -> Result<TomlConfig> {
    let explicit = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        debug!(path = %path.display(), "Loading explicit config file");
        return load_toml_config(&path);
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            debug!(path = %path.display(), "Loading default config file");
            load_toml_config(&path)
        }
        _ => {
            warn!("No config file found, using compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Default per-user config file path (`<config_dir>/sdi/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sdi").join("config.toml"))
}

/// Resolve the local storage root
///
/// Priority: CLI argument → environment variable → TOML → OS default.
pub fn resolve_storage_root(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_config: &TomlConfig,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml_config.storage_root {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_storage_root()
}

/// OS-dependent default storage root
pub fn default_storage_root() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("sdi"))
        .unwrap_or_else(|| PathBuf::from("./sdi_data"))
}
