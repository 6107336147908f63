//! Artifacts, metadata sheets and metadata records

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A binary document discovered in the input area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// File name including extension (`report.pdf`)
    pub file_name: String,
    /// File name without the artifact extension (`report`)
    pub stem: String,
    /// Current location on disk
    pub path: PathBuf,
}

/// A metadata sheet discovered in the metadata area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSource {
    pub file_name: String,
    pub stem: String,
    pub path: PathBuf,
}

impl Artifact {
    /// Build from a path, stripping `extension` from the file name to obtain the stem
    ///
    /// A file name that is not UTF-8 is converted lossily; `path` keeps the
    /// real name so the file can still be moved.
    pub fn from_path(path: &Path, extension: &str) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            stem: strip_extension(&file_name, extension).to_string(),
            file_name,
            path: path.to_path_buf(),
        }
    }
}

impl MetadataSource {
    /// Build from a path, stripping `extension` from the file name to obtain the stem
    pub fn from_path(path: &Path, extension: &str) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_string();
        Some(Self {
            stem: strip_extension(&file_name, extension).to_string(),
            file_name,
            path: path.to_path_buf(),
        })
    }
}

/// Strip a trailing `.<extension>` (ASCII case-insensitive) from a file name
pub fn strip_extension<'a>(file_name: &'a str, extension: &str) -> &'a str {
    let suffix_len = extension.len() + 1;
    if file_name.len() > suffix_len {
        let split = file_name.len() - suffix_len;
        if file_name.is_char_boundary(split) {
            let (stem, suffix) = file_name.split_at(split);
            if suffix.starts_with('.') && suffix[1..].eq_ignore_ascii_case(extension) {
                return stem;
            }
        }
    }
    file_name
}

/// One row of a metadata sheet: field name → value, in column order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    fields: Vec<(String, String)>,
}

impl MetadataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from ordered (field, value) pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut record = Self::new();
        for (field, value) in pairs {
            record.insert(field, value);
        }
        record
    }

    /// Set a field, keeping its original position if it already exists
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(existing) => existing.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    /// Value of `field`, if present
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    /// Fields in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
