//! Runtime configuration for sdi-ingest
//!
//! Built once at startup from CLI/ENV overrides layered over the TOML file and
//! compiled defaults, then passed by reference to every component.

use crate::repository::{FolderHandle, RestRepositoryClient};
use sdi_common::config::{resolve_storage_root, LayoutConfig, TaggingConfig, TomlConfig};
use sdi_common::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable consulted for the storage root
pub const STORAGE_ROOT_ENV: &str = "SDI_STORAGE_ROOT";

/// Content hash used for integrity verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Md5,
    Sha256,
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            other => Err(Error::Config(format!("Unsupported hash algorithm: {}", other))),
        }
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub storage_root: Option<PathBuf>,
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ingest_root_node: Option<String>,
    pub structure_root_node: Option<String>,
    pub log_level: Option<String>,
}

/// Repository connection settings
#[derive(Clone)]
pub struct RepositorySettings {
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
    pub page_size: u32,
    pub ingest_root: Option<FolderHandle>,
    pub structure_root: Option<FolderHandle>,
}

impl fmt::Debug for RepositorySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositorySettings")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("page_size", &self.page_size)
            .field("ingest_root", &self.ingest_root)
            .field("structure_root", &self.structure_root)
            .finish()
    }
}

/// Immutable runtime configuration
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub storage_root: PathBuf,
    pub log_level: String,
    pub repository: RepositorySettings,
    pub layout: LayoutConfig,
    pub hash_field: String,
    pub hash_algorithm: HashAlgorithm,
    pub folder_fields: Vec<String>,
    pub excluded_fields: Vec<String>,
    pub disallowed_chars: Vec<char>,
    pub tagging: TaggingConfig,
}

impl IngestConfig {
    /// Layer `overrides` over `toml_config` and validate the result
    pub fn resolve(overrides: ConfigOverrides, toml_config: TomlConfig) -> Result<Self> {
        let storage_root = resolve_storage_root(
            overrides.storage_root.as_deref(),
            STORAGE_ROOT_ENV,
            &toml_config,
        );

        let repo = toml_config.repository;
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let ingest_root = non_empty(overrides.ingest_root_node)
            .or(non_empty(repo.ingest_root_node))
            .map(FolderHandle::new);
        let structure_root = non_empty(overrides.structure_root_node)
            .or(non_empty(repo.structure_root_node))
            .map(FolderHandle::new);

        if repo.page_size == 0 {
            return Err(Error::Config("repository.page_size must be positive".to_string()));
        }
        if repo.timeout_secs == 0 {
            return Err(Error::Config("repository.timeout_secs must be positive".to_string()));
        }

        let ingest = toml_config.ingest;
        if ingest.hash_field.trim().is_empty() {
            return Err(Error::Config("ingest.hash_field must not be empty".to_string()));
        }
        let hash_algorithm: HashAlgorithm = ingest.hash_algorithm.parse()?;

        let layout = toml_config.layout;
        for (name, value) in [
            ("layout.artifact_dir", &layout.artifact_dir),
            ("layout.metadata_dir", &layout.metadata_dir),
            ("layout.artifact_extension", &layout.artifact_extension),
            ("layout.metadata_extension", &layout.metadata_extension),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{} must not be empty", name)));
            }
        }

        if toml_config.tagging.aspect.trim().is_empty() {
            return Err(Error::Config("tagging.aspect must not be empty".to_string()));
        }

        Ok(Self {
            storage_root,
            log_level: non_empty(overrides.log_level).unwrap_or(toml_config.logging.level),
            repository: RepositorySettings {
                base_url: non_empty(overrides.base_url).or(non_empty(repo.base_url)),
                username: non_empty(overrides.username).or(non_empty(repo.username)),
                password: overrides.password.or(repo.password),
                timeout: Duration::from_secs(repo.timeout_secs),
                page_size: repo.page_size,
                ingest_root,
                structure_root,
            },
            layout,
            hash_field: ingest.hash_field,
            hash_algorithm,
            folder_fields: ingest.folder_fields,
            excluded_fields: ingest.excluded_fields,
            disallowed_chars: ingest.disallowed_chars.chars().collect(),
            tagging: toml_config.tagging,
        })
    }

    /// Root folder under which documents are filed
    pub fn ingest_root(&self) -> Result<&FolderHandle> {
        self.repository.ingest_root.as_ref().ok_or_else(|| {
            Error::Config(
                "Ingest root node not configured (SDI_INGEST_ROOT_NODE or repository.ingest_root_node)"
                    .to_string(),
            )
        })
    }

    /// Root folder for the structure builders, falling back to the ingest root
    pub fn structure_root(&self) -> Result<&FolderHandle> {
        match &self.repository.structure_root {
            Some(root) => Ok(root),
            None => self.ingest_root(),
        }
    }

    /// Build the HTTP repository client
    pub fn repository_client(&self) -> Result<RestRepositoryClient> {
        let base_url = self.repository.base_url.as_deref().ok_or_else(|| {
            Error::Config(
                "Repository URL not configured (SDI_REPOSITORY_URL or repository.base_url)"
                    .to_string(),
            )
        })?;
        let username = self.repository.username.clone().ok_or_else(|| {
            Error::Config(
                "Repository username not configured (SDI_USERNAME or repository.username)"
                    .to_string(),
            )
        })?;

        RestRepositoryClient::new(
            base_url,
            username,
            self.repository.password.clone(),
            self.repository.timeout,
        )
        .map_err(|e| Error::Config(e.to_string()))
    }
}
