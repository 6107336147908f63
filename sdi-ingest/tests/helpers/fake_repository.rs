//! In-memory content repository
//!
//! Keeps a folder tree and uploaded content nodes in memory and records every
//! call, so tests can assert both the resulting tree and the traffic that
//! produced it.

use async_trait::async_trait;
use sdi_ingest::repository::{
    ChildFolder, ChildPage, ContentRepository, FolderHandle, NodeMetadata, RemoteNode,
};
use sdi_ingest::RepositoryError;
use serde_json::{Map, Value};
use std::sync::Mutex;

pub const ROOT_ID: &str = "root";
pub const ROOT_PATH: &str = "/Company Home/Scans";

/// Call made against the fake, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryCall {
    ListChildren { parent: String, skip_count: u64 },
    CreateFolder { parent: String, name: String },
    Upload { parent: String, filename: String },
    GetMetadata { node_id: String },
    UpdateMetadata { node_id: String },
}

#[derive(Debug, Clone)]
pub struct FolderNode {
    pub id: String,
    pub parent: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct ContentNode {
    pub id: String,
    pub parent: String,
    pub name: String,
    pub size: usize,
    pub aspect_names: Vec<String>,
    pub properties: Map<String, Value>,
}

#[derive(Default)]
struct State {
    folders: Vec<FolderNode>,
    contents: Vec<ContentNode>,
    calls: Vec<RepositoryCall>,
    next_id: u64,
}

/// Repository fake with optional failure injection
#[derive(Default)]
pub struct InMemoryRepository {
    state: Mutex<State>,
    fail_listing: bool,
    fail_uploads: bool,
    fail_tagging: bool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_listing() -> Self {
        Self {
            fail_listing: true,
            ..Self::default()
        }
    }

    pub fn failing_uploads() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    pub fn failing_tagging() -> Self {
        Self {
            fail_tagging: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<RepositoryCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn folders(&self) -> Vec<FolderNode> {
        self.state.lock().unwrap().folders.clone()
    }

    pub fn contents(&self) -> Vec<ContentNode> {
        self.state.lock().unwrap().contents.clone()
    }

    pub fn create_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, RepositoryCall::CreateFolder { .. }))
            .count()
    }

    pub fn upload_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, RepositoryCall::Upload { .. }))
            .count()
    }

    /// Id of the folder at `path` (`Finance/2024/Q1`) under the root
    pub fn folder_id_at(&self, path: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        let mut current = ROOT_ID.to_string();
        for name in path.split('/') {
            current = state
                .folders
                .iter()
                .find(|f| f.parent == current && f.name == name)?
                .id
                .clone();
        }
        Some(current)
    }

    fn path_of(state: &State, folder_id: &str) -> String {
        let mut names = Vec::new();
        let mut current = folder_id.to_string();
        while let Some(folder) = state.folders.iter().find(|f| f.id == current) {
            names.push(folder.name.clone());
            current = folder.parent.clone();
        }
        names.reverse();
        std::iter::once(ROOT_PATH.to_string())
            .chain(names)
            .collect::<Vec<_>>()
            .join("/")
    }

    fn allocate_id(state: &mut State, prefix: &str) -> String {
        state.next_id += 1;
        format!("{}-{}", prefix, state.next_id)
    }

    fn injected(message: &str) -> RepositoryError {
        RepositoryError::Api {
            status: 500,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl ContentRepository for InMemoryRepository {
    async fn list_child_folders(
        &self,
        parent: &FolderHandle,
        skip_count: u64,
        max_items: u32,
    ) -> Result<ChildPage, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RepositoryCall::ListChildren {
            parent: parent.to_string(),
            skip_count,
        });
        if self.fail_listing {
            return Err(Self::injected("listing unavailable"));
        }

        let children: Vec<ChildFolder> = state
            .folders
            .iter()
            .filter(|f| f.parent == parent.as_str())
            .map(|f| ChildFolder {
                id: f.id.clone(),
                name: f.name.clone(),
            })
            .collect();

        let start = (skip_count as usize).min(children.len());
        let end = (start + max_items as usize).min(children.len());
        let entries = children[start..end].to_vec();

        Ok(ChildPage {
            count: entries.len() as u64,
            has_more_items: end < children.len(),
            entries,
        })
    }

    async fn create_folder(
        &self,
        parent: &FolderHandle,
        name: &str,
    ) -> Result<FolderHandle, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RepositoryCall::CreateFolder {
            parent: parent.to_string(),
            name: name.to_string(),
        });

        let id = Self::allocate_id(&mut state, "folder");
        state.folders.push(FolderNode {
            id: id.clone(),
            parent: parent.to_string(),
            name: name.to_string(),
        });
        Ok(FolderHandle::new(id))
    }

    async fn upload_content(
        &self,
        parent: &FolderHandle,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<RemoteNode, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RepositoryCall::Upload {
            parent: parent.to_string(),
            filename: filename.to_string(),
        });
        if self.fail_uploads {
            return Err(Self::injected("upload rejected"));
        }

        // Auto-rename on collision: report.pdf -> report-1.pdf
        let taken = |name: &str| {
            state
                .contents
                .iter()
                .any(|c| c.parent == parent.as_str() && c.name == name)
        };
        let mut name = filename.to_string();
        let mut suffix = 0;
        while taken(&name) {
            suffix += 1;
            name = match filename.rsplit_once('.') {
                Some((stem, ext)) => format!("{}-{}.{}", stem, suffix, ext),
                None => format!("{}-{}", filename, suffix),
            };
        }

        let id = Self::allocate_id(&mut state, "content");
        let path = format!("{}/{}", Self::path_of(&state, parent.as_str()), name);
        state.contents.push(ContentNode {
            id: id.clone(),
            parent: parent.to_string(),
            name: name.clone(),
            size: bytes.len(),
            aspect_names: vec!["cm:titled".to_string()],
            properties: Map::new(),
        });

        Ok(RemoteNode { id, name, path })
    }

    async fn get_node_metadata(&self, node_id: &str) -> Result<NodeMetadata, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RepositoryCall::GetMetadata {
            node_id: node_id.to_string(),
        });
        if self.fail_tagging {
            return Err(Self::injected("metadata unavailable"));
        }

        let node = state
            .contents
            .iter()
            .find(|c| c.id == node_id)
            .ok_or_else(|| RepositoryError::Api {
                status: 404,
                message: format!("node {} not found", node_id),
            })?;
        Ok(NodeMetadata {
            aspect_names: node.aspect_names.clone(),
            properties: node.properties.clone(),
        })
    }

    async fn update_node_metadata(
        &self,
        node_id: &str,
        aspect_names: &[String],
        properties: &Map<String, Value>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RepositoryCall::UpdateMetadata {
            node_id: node_id.to_string(),
        });

        let node = state
            .contents
            .iter_mut()
            .find(|c| c.id == node_id)
            .ok_or_else(|| RepositoryError::Api {
                status: 404,
                message: format!("node {} not found", node_id),
            })?;
        node.aspect_names = aspect_names.to_vec();
        for (key, value) in properties {
            node.properties.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}
