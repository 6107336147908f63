//! Metadata tagger
//!
//! Adds the configured aspect to an uploaded node and writes property values
//! taken from the artifact's metadata record, in one update.

use crate::error::{IngestError, IngestResult};
use crate::models::MetadataRecord;
use crate::repository::ContentRepository;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Attaches an aspect and its properties to remote nodes
pub struct MetadataTagger {
    repository: Arc<dyn ContentRepository>,
}

impl MetadataTagger {
    pub fn new(repository: Arc<dyn ContentRepository>) -> Self {
        Self { repository }
    }

    /// Add `aspect_name` to the node's aspects (set union) and write `properties`
    ///
    /// A failure leaves the node uploaded but untagged; the upload is not
    /// rolled back.
    pub async fn tag(
        &self,
        remote_id: &str,
        aspect_name: &str,
        properties: &Map<String, Value>,
    ) -> IngestResult<()> {
        let tag_error = |source| IngestError::Tag {
            node_id: remote_id.to_string(),
            source,
        };

        let current = self
            .repository
            .get_node_metadata(remote_id)
            .await
            .map_err(tag_error)?;

        let aspects = merge_aspects(current.aspect_names, aspect_name);

        self.repository
            .update_node_metadata(remote_id, &aspects, properties)
            .await
            .map_err(tag_error)?;

        tracing::debug!(
            node_id = %remote_id,
            aspect = %aspect_name,
            properties = properties.len(),
            "Tagged node"
        );
        Ok(())
    }
}

/// Aspect set union preserving existing order
pub fn merge_aspects(mut aspects: Vec<String>, aspect_name: &str) -> Vec<String> {
    if !aspects.iter().any(|a| a == aspect_name) {
        aspects.push(aspect_name.to_string());
    }
    aspects
}

/// Property values for a record: `field -> property` mapping, missing fields skipped
pub fn build_properties(
    record: &MetadataRecord,
    mapping: &BTreeMap<String, String>,
) -> Map<String, Value> {
    let mut properties = Map::new();
    for (field, property) in mapping {
        match record.get(field) {
            Some(value) => {
                properties.insert(property.clone(), Value::String(value.to_string()));
            }
            None => {
                tracing::debug!(field = %field, property = %property, "Field absent, property skipped");
            }
        }
    }
    properties
}
