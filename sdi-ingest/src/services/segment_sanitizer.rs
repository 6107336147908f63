//! Folder-name segment sanitizer
//!
//! Turns raw metadata values into names that are safe to use as one level of a
//! repository folder path: path separators and disallowed characters become
//! `-`, trailing periods are dropped.

use crate::error::{IngestError, IngestResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters that are replaced regardless of configuration
const ALWAYS_DISALLOWED: [char; 2] = ['/', '|'];
const REPLACEMENT: char = '-';

/// One sanitized, non-empty level of a folder path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathSegment(String);

impl PathSegment {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PathSegment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Segment sanitizer with a configured disallowed-character set
#[derive(Debug, Clone)]
pub struct SegmentSanitizer {
    disallowed: Vec<char>,
}

impl SegmentSanitizer {
    /// `extra` is added to the built-in `/` and `|`
    pub fn new(extra: &[char]) -> Self {
        let mut disallowed = ALWAYS_DISALLOWED.to_vec();
        for c in extra {
            if !disallowed.contains(c) {
                disallowed.push(*c);
            }
        }
        Self { disallowed }
    }

    /// Sanitize one raw value (any displayable value is coerced to text first)
    ///
    /// Every trailing period is removed, not just the last one, so sanitizing
    /// an already sanitized value leaves it unchanged (`a..` gives `a`).
    ///
    /// An empty or blank result is a configuration/data error: the caller must
    /// never create a folder without a name.
    pub fn sanitize(&self, raw: impl fmt::Display) -> IngestResult<PathSegment> {
        let raw = raw.to_string();
        let replaced: String = raw
            .chars()
            .map(|c| {
                if self.disallowed.contains(&c) {
                    REPLACEMENT
                } else {
                    c
                }
            })
            .collect();
        let cleaned = replaced.trim_end_matches('.');

        if cleaned.trim().is_empty() {
            return Err(IngestError::Configuration(format!(
                "value '{}' yields an empty folder name",
                raw
            )));
        }

        Ok(PathSegment(cleaned.to_string()))
    }

    /// Sanitize an ordered list of values, failing on the first empty result
    pub fn sanitize_all<I, T>(&self, values: I) -> IngestResult<Vec<PathSegment>>
    where
        I: IntoIterator<Item = T>,
        T: fmt::Display,
    {
        values.into_iter().map(|v| self.sanitize(v)).collect()
    }
}

impl Default for SegmentSanitizer {
    fn default() -> Self {
        Self::new(&[])
    }
}
