//! Embeds segments and writes them to a vector store
use std::sync::Arc;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use derive_builder::Builder;
use sweepsage_core::{EmbeddingModel, Segment, SegmentGateway, StoredRecord, VectorStore};

const DEFAULT_BATCH_SIZE: usize = 10;

/// A [`SegmentGateway`] over an [`EmbeddingModel`] and a [`VectorStore`].
///
/// Segments are embedded in batches of `batch_size`. Nothing is written until every batch has
/// been embedded, and the write itself is a single call to the store, so a failing file never
/// leaves part of its segments behind.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(error = "anyhow::Error"))]
pub struct VectorGateway {
    embedder: Arc<dyn EmbeddingModel>,
    store: Arc<dyn VectorStore>,
    #[builder(default = "DEFAULT_BATCH_SIZE")]
    batch_size: usize,
}

impl VectorGateway {
    pub fn builder() -> VectorGatewayBuilder {
        VectorGatewayBuilder::default()
    }

    pub fn new(embedder: Arc<dyn EmbeddingModel>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            store,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }
}

#[async_trait]
impl SegmentGateway for VectorGateway {
    #[tracing::instrument(skip_all, fields(segments = segments.len()))]
    async fn embed_and_store(&self, segments: Vec<Segment>) -> Result<()> {
        if segments.is_empty() {
            return Ok(());
        }

        let mut vectors = Vec::with_capacity(segments.len());
        for batch in segments.chunks(self.batch_size.max(1)) {
            let texts = batch.iter().map(|s| s.text.clone()).collect::<Vec<_>>();
            let embeddings = self
                .embedder
                .embed(texts)
                .await
                .context("Failed to embed segments")?;

            anyhow::ensure!(
                embeddings.len() == batch.len(),
                "Embedding model returned {} vectors for {} segments",
                embeddings.len(),
                batch.len()
            );
            vectors.extend(embeddings);
        }

        let records = segments
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(position, (segment, vector))| StoredRecord::new(segment, vector, position))
            .collect::<Vec<_>>();

        tracing::debug!(records = records.len(), "Writing records to vector store");
        self.store
            .insert(records)
            .await
            .context("Failed to write records to vector store")
    }

    #[tracing::instrument(skip(self))]
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Segment>> {
        if k == 0 || self.store.count().await? == 0 {
            tracing::debug!("Nothing to search");
            return Ok(Vec::new());
        }

        let mut embeddings = self
            .embedder
            .embed(vec![query.to_string()])
            .await
            .context("Failed to embed query")?;
        let query_vector = embeddings
            .pop()
            .context("Embedding model returned no vector for the query")?;

        let segments = self.store.nearest(&query_vector, k).await?;
        tracing::debug!(found = segments.len(), "Similarity search done");
        Ok(segments)
    }
}
