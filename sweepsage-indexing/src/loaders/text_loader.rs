use std::path::Path;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use sweepsage_core::{Document, Loader, Metadata, SOURCE_KEY};

/// Loads a utf-8 text file as a single document
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLoader;

#[async_trait]
impl Loader for TextLoader {
    async fn load(&self, path: &Path) -> Result<Vec<Document>> {
        tracing::debug!(path = %path.display(), "Loading text file");
        let text = fs_err::tokio::read_to_string(path)
            .await
            .context("Failed to read text file")?;

        let metadata = Metadata::from([(SOURCE_KEY, path.display().to_string())]);
        Ok(vec![Document::new(text, metadata)])
    }
}
