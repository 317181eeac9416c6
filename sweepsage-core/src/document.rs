//! The units a file passes through on its way into the vector store.
//!
//! A [`Document`] is what a loader reads from disk, for example a text file or a single pdf page.
//! The chunker splits it into [`Segment`]s, which are embedded and persisted as
//! [`StoredRecord`]s.
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Embedding, Metadata, util::debug_long_utf8};

/// A block of text read from a source file, with its provenance
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub metadata: Metadata,
}

impl Document {
    pub fn new(text: impl Into<String>, metadata: impl Into<Metadata>) -> Self {
        Self {
            text: text.into(),
            metadata: metadata.into(),
        }
    }

    /// Whether the document carries any non-whitespace text
    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("text", &debug_long_utf8(&self.text, 100))
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// A bounded slice of a document. The unit of embedding and of retrieval.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub metadata: Metadata,
}

impl Segment {
    pub fn new(text: impl Into<String>, metadata: impl Into<Metadata>) -> Self {
        Self {
            text: text.into(),
            metadata: metadata.into(),
        }
    }

    /// Number of characters in the segment
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Segment")
            .field("text", &debug_long_utf8(&self.text, 100))
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// A segment with its embedding, as held by a vector store.
///
/// The id is derived from the segment's source, its position within that source and its text. A
/// file that is re-ingested after an interrupted run therefore overwrites its earlier records
/// instead of duplicating them.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: Uuid,
    pub segment: Segment,
    pub vector: Embedding,
}

impl StoredRecord {
    pub fn new(segment: Segment, vector: Embedding, position: usize) -> Self {
        let key = format!(
            "{}:{position}:{}",
            segment.metadata.source().unwrap_or_default(),
            segment.text
        );
        Self {
            id: Uuid::new_v3(&Uuid::NAMESPACE_OID, key.as_bytes()),
            segment,
            vector,
        }
    }
}

impl fmt::Debug for StoredRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredRecord")
            .field("id", &self.id)
            .field("segment", &self.segment)
            .field("vector_dims", &self.vector.len())
            .finish()
    }
}

/// Hex digest of a file's byte content. Identity key for ingestion deduplication.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Builds a fingerprint from raw digest bytes
    pub fn from_digest(digest: impl AsRef<[u8]>) -> Self {
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Fingerprint {
    fn from(value: String) -> Self {
        Self(value.trim().to_lowercase())
    }
}

impl From<&str> for Fingerprint {
    fn from(value: &str) -> Self {
        value.to_string().into()
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SOURCE_KEY;

    #[test]
    fn test_fingerprint_from_digest_is_lower_hex() {
        let fingerprint = Fingerprint::from_digest([0x0a, 0xff, 0x10]);
        assert_eq!(fingerprint.as_str(), "0aff10");
    }

    #[test]
    fn test_fingerprint_from_string_normalizes() {
        let fingerprint = Fingerprint::from("  ABCDEF\n");
        assert_eq!(fingerprint, Fingerprint::from("abcdef"));
    }

    #[test]
    fn test_record_ids_are_deterministic() {
        let segment = Segment::new("hello", [(SOURCE_KEY, "a.txt")]);

        let first = StoredRecord::new(segment.clone(), vec![1.0], 0);
        let again = StoredRecord::new(segment.clone(), vec![0.5], 0);
        let elsewhere = StoredRecord::new(segment, vec![1.0], 1);

        assert_eq!(first.id, again.id);
        assert_ne!(first.id, elsewhere.id);
    }

    #[test]
    fn test_document_has_content() {
        assert!(Document::new("text", [(SOURCE_KEY, "a.txt")]).has_content());
        assert!(!Document::new(" \n\t", [(SOURCE_KEY, "a.txt")]).has_content());
    }
}
