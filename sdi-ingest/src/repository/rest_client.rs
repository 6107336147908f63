//! REST content repository client
//!
//! Talks to the public node API (`alfresco/versions/1/nodes/...`) with basic
//! authentication. Every request carries the configured timeout; there is no
//! retry here, a failed call is terminal for the artifact being processed.

use super::{ChildFolder, ChildPage, ContentRepository, FolderHandle, NodeMetadata, RemoteNode};
use crate::error::RepositoryError;
use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

const NODES_PATH: &str = "alfresco/versions/1/nodes";
const USER_AGENT: &str = concat!("sdi-ingest/", env!("CARGO_PKG_VERSION"));

/// `{ "list": { "pagination": ..., "entries": [ { "entry": ... } ] } }`
#[derive(Debug, Deserialize)]
struct ListEnvelope<T> {
    list: ListBody<T>,
}

#[derive(Debug, Deserialize)]
struct ListBody<T> {
    entries: Vec<EntryEnvelope<T>>,
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pagination {
    #[serde(default)]
    count: u64,
    #[serde(default)]
    has_more_items: bool,
}

/// `{ "entry": ... }`
#[derive(Debug, Deserialize)]
struct EntryEnvelope<T> {
    entry: T,
}

#[derive(Debug, Deserialize)]
struct IdEntry {
    id: String,
}

#[derive(Debug, Deserialize)]
struct UploadedEntry {
    id: String,
    name: String,
    path: Option<PathInfo>,
}

#[derive(Debug, Deserialize)]
struct PathInfo {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetadataEntry {
    #[serde(default)]
    aspect_names: Vec<String>,
    #[serde(default)]
    properties: Map<String, Value>,
}

/// HTTP implementation of [`ContentRepository`]
pub struct RestRepositoryClient {
    http_client: Client,
    base_url: String,
    username: String,
    password: Option<String>,
}

impl RestRepositoryClient {
    /// Create a client for `base_url` with basic credentials and a per-request timeout
    pub fn new(
        base_url: &str,
        username: impl Into<String>,
        password: Option<String>,
        timeout: Duration,
    ) -> Result<Self, RepositoryError> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(|e| RepositoryError::Build(e.to_string()))?;

        let mut base_url = base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            http_client,
            base_url,
            username: username.into(),
            password,
        })
    }

    fn node_url(&self, node_id: &str) -> String {
        format!("{}{}/{}", self.base_url, NODES_PATH, node_id)
    }

    fn children_url(&self, node_id: &str) -> String {
        format!("{}/children", self.node_url(node_id))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, RepositoryError> {
        let response = request
            .basic_auth(&self.username, self.password.as_deref())
            .send()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RepositoryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: Response,
    ) -> Result<T, RepositoryError> {
        response
            .json()
            .await
            .map_err(|e| RepositoryError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ContentRepository for RestRepositoryClient {
    async fn list_child_folders(
        &self,
        parent: &FolderHandle,
        skip_count: u64,
        max_items: u32,
    ) -> Result<ChildPage, RepositoryError> {
        let url = self.children_url(parent.as_str());
        tracing::debug!(parent = %parent, skip_count, max_items, "Listing child folders");

        let request = self.http_client.get(&url).query(&[
            ("maxItems", max_items.to_string()),
            ("skipCount", skip_count.to_string()),
            ("where", "(isFolder=true)".to_string()),
            ("fields", "id,name".to_string()),
        ]);
        let envelope: ListEnvelope<ChildFolder> = Self::parse(self.send(request).await?).await?;

        Ok(ChildPage {
            entries: envelope.list.entries.into_iter().map(|e| e.entry).collect(),
            has_more_items: envelope.list.pagination.has_more_items,
            count: envelope.list.pagination.count,
        })
    }

    async fn create_folder(
        &self,
        parent: &FolderHandle,
        name: &str,
    ) -> Result<FolderHandle, RepositoryError> {
        let url = self.children_url(parent.as_str());
        let request = self.http_client.post(&url).json(&json!({
            "name": name,
            "nodeType": "cm:folder",
        }));
        let envelope: EntryEnvelope<IdEntry> = Self::parse(self.send(request).await?).await?;

        tracing::info!(parent = %parent, name = %name, id = %envelope.entry.id, "Created folder");
        Ok(FolderHandle::new(envelope.entry.id))
    }

    async fn upload_content(
        &self,
        parent: &FolderHandle,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<RemoteNode, RepositoryError> {
        let url = self.children_url(parent.as_str());
        let size = bytes.len();
        let form = multipart::Form::new()
            .part(
                "filedata",
                multipart::Part::bytes(bytes).file_name(filename.to_string()),
            )
            .text("autoRename", "true");

        tracing::debug!(parent = %parent, filename = %filename, size, "Uploading content");

        let request = self
            .http_client
            .post(&url)
            .query(&[("include", "path"), ("autoRename", "true")])
            .multipart(form);
        let envelope: EntryEnvelope<UploadedEntry> =
            Self::parse(self.send(request).await?).await?;

        let entry = envelope.entry;
        let path = match entry.path {
            Some(parent_path) => format!("{}/{}", parent_path.name.trim_end_matches('/'), entry.name),
            None => entry.name.clone(),
        };

        Ok(RemoteNode {
            id: entry.id,
            name: entry.name,
            path,
        })
    }

    async fn get_node_metadata(&self, node_id: &str) -> Result<NodeMetadata, RepositoryError> {
        let request = self
            .http_client
            .get(self.node_url(node_id))
            .query(&[("include", "aspectNames,properties")]);
        let envelope: EntryEnvelope<MetadataEntry> =
            Self::parse(self.send(request).await?).await?;

        Ok(NodeMetadata {
            aspect_names: envelope.entry.aspect_names,
            properties: envelope.entry.properties,
        })
    }

    async fn update_node_metadata(
        &self,
        node_id: &str,
        aspect_names: &[String],
        properties: &Map<String, Value>,
    ) -> Result<(), RepositoryError> {
        let request = self.http_client.put(self.node_url(node_id)).json(&json!({
            "aspectNames": aspect_names,
            "properties": properties,
        }));
        self.send(request).await?;
        Ok(())
    }
}
