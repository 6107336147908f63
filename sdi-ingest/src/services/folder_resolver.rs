//! Folder path resolver
//!
//! Resolves an ordered list of segments under a root folder to the handle of
//! the leaf folder, reusing existing children and creating missing ones.
//!
//! # Algorithm
//! For each segment, root to leaf:
//! 1. List child folders of the current folder page by page. Paging continues
//!    while the repository reports more items AND the last page was non-empty.
//! 2. Keep children whose name equals the segment exactly (case-sensitive).
//! 3. Descend into the first match, or create the folder and descend into it.
//!
//! The resolver keeps no handles between calls, so repeated resolution of the
//! same path converges on the folders created by the first call. Within one
//! process the list-then-create step is serialized per (parent, name), which
//! prevents two concurrent resolutions from creating duplicate siblings. Other
//! processes working on the same root are not coordinated.

use crate::error::{IngestError, IngestResult, RepositoryError};
use crate::repository::{ChildFolder, ContentRepository, FolderHandle};
use crate::services::segment_sanitizer::PathSegment;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Children requested per listing page
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

type CreationKey = (FolderHandle, String);

/// Folder path resolver
pub struct FolderPathResolver {
    repository: Arc<dyn ContentRepository>,
    page_size: u32,
    creation_locks: Mutex<HashMap<CreationKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl FolderPathResolver {
    pub fn new(repository: Arc<dyn ContentRepository>, page_size: u32) -> Self {
        Self {
            repository,
            page_size: page_size.max(1),
            creation_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve `segments` under `root`, creating missing folders
    ///
    /// An empty segment list resolves to `root` itself. Any listing or
    /// creation failure aborts resolution with [`IngestError::Resolution`].
    pub async fn resolve(
        &self,
        root: &FolderHandle,
        segments: &[PathSegment],
    ) -> IngestResult<FolderHandle> {
        let mut current = root.clone();

        for segment in segments {
            current = self
                .resolve_child(&current, segment.as_str())
                .await
                .map_err(|source| IngestError::Resolution {
                    segment: segment.to_string(),
                    source,
                })?;
        }

        tracing::debug!(
            root = %root,
            path = %display_path(segments),
            leaf = %current,
            "Resolved folder path"
        );

        Ok(current)
    }

    async fn resolve_child(
        &self,
        parent: &FolderHandle,
        name: &str,
    ) -> Result<FolderHandle, RepositoryError> {
        let lock = self.creation_lock(parent, name);
        let _guard = lock.lock().await;

        let matches = self.find_children(parent, name).await?;
        if let Some(first) = matches.first() {
            if matches.len() > 1 {
                tracing::warn!(
                    parent = %parent,
                    name = %name,
                    duplicates = matches.len(),
                    chosen = %first.id,
                    "Duplicate sibling folders, using first listed"
                );
            }
            return Ok(FolderHandle::new(first.id.clone()));
        }

        self.repository.create_folder(parent, name).await
    }

    /// All children of `parent` named exactly `name`, in listing order
    async fn find_children(
        &self,
        parent: &FolderHandle,
        name: &str,
    ) -> Result<Vec<ChildFolder>, RepositoryError> {
        let mut matches = Vec::new();
        let mut skip_count = 0u64;

        loop {
            let page = self
                .repository
                .list_child_folders(parent, skip_count, self.page_size)
                .await?;

            let page_len = page.entries.len();
            matches.extend(page.entries.into_iter().filter(|child| child.name == name));

            // An empty page ends paging even if more items are claimed
            if !page.has_more_items || page.count == 0 || page_len == 0 {
                break;
            }
            skip_count += u64::from(self.page_size);
        }

        Ok(matches)
    }

    fn creation_lock(&self, parent: &FolderHandle, name: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .creation_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry((parent.clone(), name.to_string()))
            .or_default()
            .clone()
    }
}

/// `Finance/2024/Q1` rendering of a segment list
pub fn display_path(segments: &[PathSegment]) -> String {
    segments
        .iter()
        .map(PathSegment::as_str)
        .collect::<Vec<_>>()
        .join("/")
}
