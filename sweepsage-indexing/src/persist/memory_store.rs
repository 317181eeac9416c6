use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use sweepsage_core::{Segment, StoredRecord, VectorStore, util::top_k_by_similarity};

/// A simple in-memory vector store.
///
/// Records with an id that is already present replace the earlier record. Searching is an exact
/// scan over all records. Great for experimentation, dry runs and testing.
#[derive(Debug, Default, Clone)]
pub struct MemoryVectorStore {
    records: Arc<RwLock<Vec<StoredRecord>>>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve all records in insertion order
    pub async fn get_all(&self) -> Vec<StoredRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn insert(&self, records: Vec<StoredRecord>) -> Result<()> {
        let mut lock = self.records.write().await;
        for record in records {
            if let Some(existing) = lock.iter_mut().find(|r| r.id == record.id) {
                *existing = record;
            } else {
                lock.push(record);
            }
        }
        Ok(())
    }

    async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<Segment>> {
        let records = self.records.read().await.clone();
        Ok(top_k_by_similarity(records, query, k))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().await.len())
    }
}
