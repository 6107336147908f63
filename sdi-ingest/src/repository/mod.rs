//! Remote content repository seam
//!
//! The pipeline talks to the repository only through [`ContentRepository`]:
//! a node/children/properties API with paginated child listing.
//! [`RestRepositoryClient`] is the HTTP implementation.

mod rest_client;

pub use rest_client::RestRepositoryClient;

use crate::error::RepositoryError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Opaque identifier of a remote folder node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderHandle(String);

impl FolderHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One child folder as returned by a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildFolder {
    pub id: String,
    pub name: String,
}

/// One page of a child-folder listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildPage {
    pub entries: Vec<ChildFolder>,
    /// Repository claims more items exist beyond this page
    pub has_more_items: bool,
    /// Number of entries the repository reports for this page
    pub count: u64,
}

/// A content node created by an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteNode {
    pub id: String,
    pub name: String,
    /// Full repository path of the node, including its own name
    pub path: String,
}

/// Classification state of a node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeMetadata {
    pub aspect_names: Vec<String>,
    pub properties: Map<String, Value>,
}

/// Operations consumed from the remote content repository
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// List one page of child folders of `parent`
    async fn list_child_folders(
        &self,
        parent: &FolderHandle,
        skip_count: u64,
        max_items: u32,
    ) -> Result<ChildPage, RepositoryError>;

    /// Create a folder named `name` under `parent`
    async fn create_folder(
        &self,
        parent: &FolderHandle,
        name: &str,
    ) -> Result<FolderHandle, RepositoryError>;

    /// Upload `bytes` as a new content node under `parent`, auto-renaming on collision
    async fn upload_content(
        &self,
        parent: &FolderHandle,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<RemoteNode, RepositoryError>;

    /// Read a node's aspects and properties
    async fn get_node_metadata(&self, node_id: &str) -> Result<NodeMetadata, RepositoryError>;

    /// Replace a node's aspect set and merge in `properties`
    async fn update_node_metadata(
        &self,
        node_id: &str,
        aspect_names: &[String],
        properties: &Map<String, Value>,
    ) -> Result<(), RepositoryError>;
}
