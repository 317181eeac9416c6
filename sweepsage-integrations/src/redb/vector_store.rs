use anyhow::{Context as _, Result};
use async_trait::async_trait;
use redb::{ReadableTable as _, ReadableTableMetadata as _};
use sweepsage_core::{Segment, StoredRecord, VectorStore, util::top_k_by_similarity};

use super::RedbVectorStore;

impl RedbVectorStore {
    fn read_all(&self) -> Result<Vec<StoredRecord>> {
        let read_txn = self.database.begin_read()?;
        let table = match read_txn.open_table(self.table_definition()) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let record: StoredRecord =
                serde_json::from_slice(value.value()).context("Corrupt record in vector store")?;
            records.push(record);
        }
        Ok(records)
    }
}

#[async_trait]
impl VectorStore for RedbVectorStore {
    #[tracing::instrument(skip_all, fields(records = records.len()))]
    async fn insert(&self, records: Vec<StoredRecord>) -> Result<()> {
        let write_txn = self.database.begin_write()?;
        {
            let mut table = write_txn.open_table(self.table_definition())?;
            for record in &records {
                let key = record.id.to_string();
                let value = serde_json::to_vec(record)?;
                table.insert(key.as_str(), value.as_slice())?;
            }
        }
        write_txn.commit()?;

        tracing::debug!(collection = self.collection_name(), "Committed records");
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(k = k))]
    async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<Segment>> {
        let records = self.read_all()?;
        Ok(top_k_by_similarity(records, query, k))
    }

    async fn count(&self) -> Result<usize> {
        let read_txn = self.database.begin_read()?;
        match read_txn.open_table(self.table_definition()) {
            Ok(table) => Ok(usize::try_from(table.len()?)?),
            Err(redb::TableError::TableDoesNotExist { .. }) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}
