//! Redb is a simple, portable, high-performance, ACID, embedded key-value store.
//!
//! Here it persists stored records between runs, without the need for external services.
use anyhow::Result;
use std::{path::PathBuf, sync::Arc};

use derive_builder::Builder;

mod vector_store;

/// A [`VectorStore`](sweepsage_core::VectorStore) persisted in a redb database.
///
/// Records live in a table named after the collection, keyed by record id, with the record
/// encoded as json. Every insert is a single write transaction. Search is an exact scan.
#[derive(Clone, Builder)]
#[builder(build_fn(error = "anyhow::Error"))]
pub struct RedbVectorStore {
    #[builder(setter(into), default = "Arc::new(self.default_database()?)")]
    database: Arc<redb::Database>,

    /// Path to the database file, required if no database is provided
    #[builder(setter(into, strip_option), default)]
    database_path: Option<PathBuf>,
    #[builder(setter(into), default = "\"sweepsage\".to_string()")]
    collection_name: String,
}

impl std::fmt::Debug for RedbVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbVectorStore")
            .field("database", &self.database)
            .field("database_path", &self.database_path)
            .field("collection_name", &self.collection_name)
            .finish()
    }
}

impl RedbVectorStoreBuilder {
    fn default_database(&self) -> Result<redb::Database> {
        let path = self
            .database_path
            .clone()
            .flatten()
            .ok_or(anyhow::anyhow!("Expected database path"))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        Ok(redb::Database::create(path)?)
    }
}

impl RedbVectorStore {
    pub fn builder() -> RedbVectorStoreBuilder {
        RedbVectorStoreBuilder::default()
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    pub(crate) fn table_definition(&self) -> redb::TableDefinition<'_, &'static str, &'static [u8]> {
        redb::TableDefinition::<&str, &[u8]>::new(&self.collection_name)
    }
}
