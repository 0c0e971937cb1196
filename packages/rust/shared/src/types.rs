//! Core domain types for askbase snapshots.

use serde::{Deserialize, Serialize};

/// One source's extracted content paired with its origin identifier.
///
/// A record exists in a snapshot only if its fetch succeeded; failed sources
/// leave gaps, never placeholders. The on-disk snapshot artifact is exactly an
/// ordered JSON array of these, in the order the sources were configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    /// Identifier (URL) of the origin the content was fetched from.
    pub source: String,
    /// Text content extracted from the source.
    pub content: String,
}

impl KnowledgeRecord {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }
}
