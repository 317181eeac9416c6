//! Traits at the seams of the ingestion pipeline.
//!
//! The pipeline only talks to loaders, the ledger and the gateway through these traits, so any of
//! them can be swapped for another backend or a mock.
use std::{fmt::Debug, path::Path};

use anyhow::Result;
use async_trait::async_trait;

use crate::{
    Document, Embeddings, Fingerprint, Segment, StoredRecord,
    chat_completion::errors::LanguageModelError,
};

#[cfg(feature = "test-utils")]
#[doc(hidden)]
use mockall::{automock, predicate::str};

#[cfg_attr(feature = "test-utils", automock)]
#[async_trait]
/// Reads a single file into an ordered list of documents
pub trait Loader: Send + Sync + Debug {
    async fn load(&self, path: &Path) -> Result<Vec<Document>>;
}

#[cfg_attr(feature = "test-utils", automock)]
#[async_trait]
/// Embeds a list of strings and returns its embeddings, in the same order.
/// Assumes the strings will be moved.
pub trait EmbeddingModel: Send + Sync + Debug {
    async fn embed(&self, input: Vec<String>) -> Result<Embeddings, LanguageModelError>;
}

#[cfg_attr(feature = "test-utils", automock)]
#[async_trait]
/// Holds stored records and answers nearest-neighbour queries over them
pub trait VectorStore: Send + Sync + Debug {
    /// Writes all records or none of them
    async fn insert(&self, records: Vec<StoredRecord>) -> Result<()>;

    /// The `k` records closest to `query`, closest first
    async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<Segment>>;

    /// Number of records held
    async fn count(&self) -> Result<usize>;
}

#[cfg_attr(feature = "test-utils", automock)]
#[async_trait]
/// Turns segments into vectors and persists them, and answers similarity queries by text.
pub trait SegmentGateway: Send + Sync + Debug {
    /// Embeds and persists all segments. Fails without persisting anything.
    async fn embed_and_store(&self, segments: Vec<Segment>) -> Result<()>;

    /// Up to `k` segments nearest to `query`, closest first. Empty when nothing is stored.
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Segment>>;
}

#[cfg_attr(feature = "test-utils", automock)]
#[async_trait]
/// Remembers which file contents have been ingested
pub trait IngestionLedger: Send + Sync + Debug {
    async fn contains(&self, fingerprint: &Fingerprint) -> Result<bool>;
    async fn record(&self, fingerprint: &Fingerprint) -> Result<()>;
}
