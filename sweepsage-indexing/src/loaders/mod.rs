//! Loaders turn a file into an ordered list of [`Document`]s.
//!
//! [`DocumentLoaders`] picks a loader by file extension. Files without a matching loader load
//! as nothing at all rather than failing, so a stray file in the data directory never stops an
//! ingestion run.
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use async_trait::async_trait;
use sweepsage_core::{Document, Loader};

#[cfg(feature = "pdf")]
mod pdf_loader;
mod text_loader;

#[cfg(feature = "pdf")]
pub use pdf_loader::PdfLoader;
pub use text_loader::TextLoader;

/// Normalizes an extension as written in configuration, `.TXT` becomes `txt`
pub(crate) fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| normalize_extension(&ext.to_string_lossy()))
}

/// Loaders by file extension
#[derive(Debug, Clone)]
pub struct DocumentLoaders {
    loaders: Vec<(String, Arc<dyn Loader>)>,
}

impl Default for DocumentLoaders {
    /// Plain text for `txt`, and pdf for `pdf` when the `pdf` feature is enabled
    fn default() -> Self {
        let loaders = Self::empty().with_loader("txt", TextLoader);
        #[cfg(feature = "pdf")]
        let loaders = loaders.with_loader("pdf", PdfLoader);
        loaders
    }
}

impl DocumentLoaders {
    /// No loaders at all, every file loads as empty
    pub fn empty() -> Self {
        Self {
            loaders: Vec::new(),
        }
    }

    /// Registers a loader for an extension, replacing an earlier one for the same extension
    #[must_use]
    pub fn with_loader(mut self, extension: &str, loader: impl Loader + 'static) -> Self {
        let extension = normalize_extension(extension);
        self.loaders.retain(|(ext, _)| *ext != extension);
        self.loaders.push((extension, Arc::new(loader)));
        self
    }

    pub fn loader_for(&self, path: &Path) -> Option<&Arc<dyn Loader>> {
        let extension = extension_of(path)?;
        self.loaders
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, loader)| loader)
    }

    pub fn supports(&self, path: &Path) -> bool {
        self.loader_for(path).is_some()
    }
}

#[async_trait]
impl Loader for DocumentLoaders {
    /// Loads with the loader registered for the file's extension, or returns no documents
    async fn load(&self, path: &Path) -> Result<Vec<Document>> {
        let Some(loader) = self.loader_for(path) else {
            tracing::warn!(path = %path.display(), "No loader for file type, nothing to load");
            return Ok(Vec::new());
        };
        loader.load(path).await
    }
}

/// Lists the files directly inside `dir` whose extension is one of `extensions`.
///
/// Subdirectories are not descended into. A directory that does not exist lists as empty. The
/// result is sorted so runs process files in a stable order.
pub async fn list_dir_with_allowed_types(dir: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let allowed = extensions
        .iter()
        .map(|ext| normalize_extension(ext))
        .collect::<Vec<_>>();

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!(dir = %dir.display(), error = %e, "Data directory cannot be listed");
            return Vec::new();
        }
    };

    let mut files = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(dir = %dir.display(), error = %e, "Failed to read directory entry");
                break;
            }
        };
        let path = entry.path();
        let is_file = entry.file_type().await.is_ok_and(|ft| ft.is_file());
        if is_file && extension_of(&path).is_some_and(|ext| allowed.contains(&ext)) {
            files.push(path);
        }
    }

    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use temp_dir::TempDir;
    use test_case::test_case;

    #[test_case("txt", "txt")]
    #[test_case(".pdf", "pdf")]
    #[test_case(" .TXT ", "txt")]
    fn test_normalize_extension(input: &str, expected: &str) {
        assert_eq!(normalize_extension(input), expected);
    }

    #[tokio::test]
    async fn test_lists_only_allowed_files_non_recursively() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.child("b.txt"), "b").unwrap();
        std::fs::write(dir.child("a.TXT"), "a").unwrap();
        std::fs::write(dir.child("manual.pdf"), "not really").unwrap();
        std::fs::write(dir.child("notes.md"), "ignored").unwrap();
        std::fs::create_dir(dir.child("nested")).unwrap();
        std::fs::write(dir.child("nested").join("deep.txt"), "ignored").unwrap();

        let files = list_dir_with_allowed_types(dir.path(), &["txt".into(), ".pdf".into()]).await;

        assert_eq!(
            files,
            vec![dir.child("a.TXT"), dir.child("b.txt"), dir.child("manual.pdf")]
        );
    }

    #[tokio::test]
    async fn test_missing_directory_lists_empty() {
        let dir = TempDir::new().unwrap();
        let files = list_dir_with_allowed_types(&dir.child("missing"), &["txt".into()]).await;
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_extension_loads_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.child("table.csv");
        std::fs::write(&path, "a,b\n1,2").unwrap();

        let documents = DocumentLoaders::default().load(&path).await.unwrap();
        assert!(documents.is_empty());
    }

    #[tokio::test]
    async fn test_dispatches_on_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.child("guide.TXT");
        std::fs::write(&path, "Empty the dust bin weekly.").unwrap();

        let loaders = DocumentLoaders::default();
        assert!(loaders.supports(&path));

        let documents = loaders.load(&path).await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].text, "Empty the dust bin weekly.");
    }

    #[tokio::test]
    async fn test_custom_loader_replaces_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.child("a.txt");
        std::fs::write(&path, "ignored").unwrap();

        let mut mock = sweepsage_core::MockLoader::new();
        mock.expect_load()
            .returning(|_| Ok(vec![Document::new("from mock", [("source", "mock")])]));

        let loaders = DocumentLoaders::default().with_loader("txt", mock);
        let documents = loaders.load(&path).await.unwrap();

        assert_eq!(documents[0].text, "from mock");
    }
}
