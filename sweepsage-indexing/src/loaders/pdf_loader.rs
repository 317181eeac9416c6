use std::path::Path;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use itertools::Itertools as _;
use sweepsage_core::{Document, Loader, Metadata, PAGE_KEY, SOURCE_KEY};

/// Loads a pdf as one document per page.
///
/// # Metadata
/// Each document includes:
/// - `source`: The path of the pdf
/// - `page_number`: The page number (1-based)
/// - `total_pages`: Total number of pages in the pdf
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLoader;

#[async_trait]
impl Loader for PdfLoader {
    async fn load(&self, path: &Path) -> Result<Vec<Document>> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || extract_pdf_pages(&path))
            .await
            .context("Pdf extraction task panicked")?
    }
}

#[tracing::instrument(skip_all, fields(path = %path.display()))]
fn extract_pdf_pages(path: &Path) -> Result<Vec<Document>> {
    tracing::debug!("Reading pdf file");
    let doc = match lopdf::Document::load(path) {
        Ok(doc) => doc,
        Err(e) if e.to_string().to_lowercase().contains("encrypted") => {
            anyhow::bail!("Pdf is encrypted and cannot be processed: {}", path.display());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to load pdf file: {}", path.display()));
        }
    };

    let page_numbers = doc.get_pages().keys().copied().sorted().collect::<Vec<_>>();
    let total_pages = page_numbers.len();
    let source = path.display().to_string();

    let mut documents = Vec::with_capacity(total_pages);
    for page_number in page_numbers {
        let text = doc.extract_text(&[page_number]).with_context(|| {
            format!(
                "Failed to extract text from page {page_number} of pdf: {}",
                path.display()
            )
        })?;

        tracing::debug!(
            page = page_number,
            text_length = text.len(),
            "Extracted text from pdf page"
        );

        let metadata = Metadata::from([
            (SOURCE_KEY, serde_json::Value::from(source.as_str())),
            (PAGE_KEY, serde_json::Value::from(page_number)),
            ("total_pages", serde_json::Value::from(total_pages)),
        ]);
        documents.push(Document::new(text, metadata));
    }

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{
        Object, Stream,
        content::{Content, Operation},
        dictionary,
    };
    use temp_dir::TempDir;

    fn write_pdf(path: &Path, pages: &[&str]) {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = i64::try_from(kids.len()).unwrap();
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_one_document_per_page() {
        let dir = TempDir::new().unwrap();
        let path = dir.child("manual.pdf");
        write_pdf(&path, &["Charge the robot", "Clean the brushes"]);

        let documents = PdfLoader.load(&path).await.unwrap();

        assert_eq!(documents.len(), 2);
        assert!(documents[0].text.contains("Charge the robot"));
        assert!(documents[1].text.contains("Clean the brushes"));

        let metadata = &documents[1].metadata;
        assert_eq!(metadata.get(PAGE_KEY), Some(&serde_json::json!(2)));
        assert_eq!(metadata.get("total_pages"), Some(&serde_json::json!(2)));
        assert_eq!(metadata.source(), Some(path.display().to_string().as_str()));
    }

    #[tokio::test]
    async fn test_not_a_pdf_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.child("fake.pdf");
        std::fs::write(&path, "plain text pretending").unwrap();

        assert!(PdfLoader.load(&path).await.is_err());
    }
}
