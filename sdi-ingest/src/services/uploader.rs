//! Repository uploader
//!
//! Files one artifact into its resolved folder as a single multipart upload.
//! Name collisions are auto-renamed by the repository; nothing is overwritten.

use crate::error::{IngestError, IngestResult};
use crate::repository::{ContentRepository, FolderHandle, RemoteNode};
use std::sync::Arc;

/// Uploads artifacts into resolved folders
pub struct RepositoryUploader {
    repository: Arc<dyn ContentRepository>,
}

impl RepositoryUploader {
    pub fn new(repository: Arc<dyn ContentRepository>) -> Self {
        Self { repository }
    }

    /// Upload `bytes` as `filename` into `folder`
    ///
    /// Creates exactly one content node. The returned node carries the name the
    /// repository actually used, which differs from `filename` after a rename.
    pub async fn upload(
        &self,
        folder: &FolderHandle,
        bytes: Vec<u8>,
        filename: &str,
    ) -> IngestResult<RemoteNode> {
        let size = bytes.len();
        let node = self
            .repository
            .upload_content(folder, filename, bytes)
            .await
            .map_err(|source| IngestError::Upload {
                filename: filename.to_string(),
                source,
            })?;

        if node.name != filename {
            tracing::info!(
                requested = %filename,
                stored = %node.name,
                "Repository renamed upload to avoid a collision"
            );
        }
        tracing::debug!(
            folder = %folder,
            node_id = %node.id,
            path = %node.path,
            size,
            "Uploaded artifact"
        );

        Ok(node)
    }
}
