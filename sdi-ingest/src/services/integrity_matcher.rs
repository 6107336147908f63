//! Artifact/metadata pairing and integrity verification
//!
//! An artifact pairs with the metadata sheet whose stem equals its own stem
//! (case-sensitive). The first data row of that sheet supplies the expected
//! content hash, compared as an exact string against the computed digest.

use crate::config::HashAlgorithm;
use crate::error::{IngestError, IngestResult};
use crate::models::{Artifact, MetadataRecord, MetadataSource};
use crate::services::metadata_reader::TabularReader;
use md5::Md5;
use sha2::{Digest, Sha256};

/// Pairs artifacts with metadata and verifies content hashes
#[derive(Debug, Clone)]
pub struct IntegrityMatcher {
    hash_field: String,
    algorithm: HashAlgorithm,
}

impl IntegrityMatcher {
    pub fn new(hash_field: impl Into<String>, algorithm: HashAlgorithm) -> Self {
        Self {
            hash_field: hash_field.into(),
            algorithm,
        }
    }

    pub fn hash_field(&self) -> &str {
        &self.hash_field
    }

    /// Find the metadata sheet for `artifact`
    ///
    /// When several sheets share the stem the first one is used.
    pub fn match_source<'a>(
        &self,
        artifact: &Artifact,
        sources: &'a [MetadataSource],
    ) -> IngestResult<&'a MetadataSource> {
        let mut candidates = sources.iter().filter(|s| s.stem == artifact.stem);
        let first = candidates.next().ok_or_else(|| IngestError::NoMatch {
            artifact: artifact.file_name.clone(),
        })?;

        let extra = candidates.count();
        if extra > 0 {
            tracing::warn!(
                artifact = %artifact.file_name,
                chosen = %first.file_name,
                ignored = extra,
                "Several metadata sheets match artifact, using first"
            );
        }

        Ok(first)
    }

    /// Read the first data row of `source`
    pub fn load_record(
        &self,
        source: &MetadataSource,
        reader: &dyn TabularReader,
    ) -> IngestResult<MetadataRecord> {
        reader
            .read_records(&source.path)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                IngestError::Configuration(format!(
                    "metadata sheet {} has no data rows",
                    source.file_name
                ))
            })
    }

    /// Verify `bytes` against the record's hash field, returning the digest
    pub fn verify(&self, bytes: &[u8], record: &MetadataRecord) -> IngestResult<String> {
        let expected = record.get(&self.hash_field).ok_or_else(|| {
            IngestError::Configuration(format!(
                "metadata record has no '{}' field",
                self.hash_field
            ))
        })?;

        let actual = content_hash(self.algorithm, bytes);
        if actual != expected {
            return Err(IngestError::Mismatch {
                expected: expected.to_string(),
                actual,
            });
        }

        Ok(actual)
    }
}

/// Lowercase hex digest of `bytes`
pub fn content_hash(algorithm: HashAlgorithm, bytes: &[u8]) -> String {
    match algorithm {
        HashAlgorithm::Md5 => format!("{:x}", Md5::digest(bytes)),
        HashAlgorithm::Sha256 => format!("{:x}", Sha256::digest(bytes)),
    }
}
