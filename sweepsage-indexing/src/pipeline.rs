use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context as _, Result};
use derive_builder::Builder;
use sweepsage_core::{IngestionLedger, Loader, SegmentGateway};
use tracing::Instrument as _;

use crate::{
    chunker::RecursiveCharacterSplitter,
    hasher::fingerprint_file,
    loaders::{DocumentLoaders, list_dir_with_allowed_types},
};

/// Walks a data directory and ingests every file whose content has not been ingested before.
///
/// Files are processed one at a time, in path order. For each file the pipeline:
///
/// 1. Computes its [`Fingerprint`](sweepsage_core::Fingerprint) and skips it if the ledger
///    already holds it
/// 2. Loads it into documents and splits those into segments, skipping the file if either step
///    yields nothing
/// 3. Embeds and stores the segments through the gateway
/// 4. Records the fingerprint, only after the store write succeeded
///
/// Any failure is logged and the run moves on to the next file without recording it, so the file
/// is retried on the next run. Running the pipeline twice over an unchanged directory stores
/// nothing the second time.
///
/// Only the immediate files of the data directory are considered.
///
/// # Example
///
/// ```no_run
/// # use std::sync::Arc;
/// # use sweepsage_core::{IngestionLedger, SegmentGateway};
/// # use sweepsage_indexing::{FileLedger, IngestionPipeline, RecursiveCharacterSplitter, VectorGateway};
/// # async fn run(gateway: VectorGateway) -> anyhow::Result<()> {
/// let ledger: Arc<dyn IngestionLedger> = Arc::new(FileLedger::new("store/md5_hex_store"));
/// let gateway: Arc<dyn SegmentGateway> = Arc::new(gateway);
///
/// let pipeline = IngestionPipeline::builder()
///     .data_dir("data")
///     .allowed_extensions(vec!["txt".to_string(), "pdf".to_string()])
///     .ledger(ledger)
///     .chunker(RecursiveCharacterSplitter::new(1000, 100, Vec::new())?)
///     .gateway(gateway)
///     .build()?;
/// let summary = pipeline.run().await?;
///
/// println!("{summary}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(error = "anyhow::Error"))]
pub struct IngestionPipeline {
    data_dir: PathBuf,
    #[builder(default = "default_extensions()")]
    allowed_extensions: Vec<String>,
    ledger: Arc<dyn IngestionLedger>,
    /// Defaults to [`DocumentLoaders::default`]
    #[builder(default = "Arc::new(DocumentLoaders::default())")]
    loader: Arc<dyn Loader>,
    chunker: RecursiveCharacterSplitter,
    gateway: Arc<dyn SegmentGateway>,
}

fn default_extensions() -> Vec<String> {
    vec!["txt".to_string(), "pdf".to_string()]
}

/// What happened to a single file during a run
#[derive(Debug, Clone, PartialEq, Eq, strum_macros::EnumIs)]
pub enum FileOutcome {
    /// Segments were stored and the fingerprint recorded
    Ingested { segments: usize },
    /// The fingerprint was already in the ledger
    SkippedExisting,
    /// Loading or splitting produced nothing. Not recorded, so skipped again next run.
    Empty,
    /// Hashing, loading, storing or recording failed. Retried next run.
    Failed { error: String },
}

/// Counts for a single pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionSummary {
    /// Files in the data directory with an allowed extension
    pub discovered: usize,
    pub ingested: usize,
    pub skipped_existing: usize,
    pub skipped_empty: usize,
    pub failed: Vec<PathBuf>,
    pub segments_written: usize,
}

impl IngestionSummary {
    /// Every eligible file had already been ingested
    pub fn is_nothing_new(&self) -> bool {
        self.discovered > 0 && self.skipped_existing == self.discovered
    }

    fn add(&mut self, path: &Path, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Ingested { segments } => {
                self.ingested += 1;
                self.segments_written += segments;
            }
            FileOutcome::SkippedExisting => self.skipped_existing += 1,
            FileOutcome::Empty => self.skipped_empty += 1,
            FileOutcome::Failed { .. } => self.failed.push(path.to_path_buf()),
        }
    }
}

impl fmt::Display for IngestionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nothing_new() {
            return write!(f, "Nothing new to ingest ({} files)", self.discovered);
        }
        write!(
            f,
            "{} files: {} ingested ({} segments), {} already ingested, {} empty, {} failed",
            self.discovered,
            self.ingested,
            self.segments_written,
            self.skipped_existing,
            self.skipped_empty,
            self.failed.len()
        )
    }
}

impl IngestionPipeline {
    pub fn builder() -> IngestionPipelineBuilder {
        IngestionPipelineBuilder::default()
    }

    /// Runs the pipeline over the data directory.
    ///
    /// Per-file failures are part of the summary, not an error.
    ///
    /// # Errors
    ///
    /// Does not fail at present.
    #[tracing::instrument(skip_all, fields(data_dir = %self.data_dir.display()), name = "ingestion.run")]
    pub async fn run(&self) -> Result<IngestionSummary> {
        let files = list_dir_with_allowed_types(&self.data_dir, &self.allowed_extensions).await;
        tracing::info!(files = files.len(), "Starting ingestion");

        let mut summary = IngestionSummary {
            discovered: files.len(),
            ..Default::default()
        };

        for path in &files {
            let span = tracing::info_span!("ingestion.file", path = %path.display());
            let outcome = self.process_file(path).instrument(span).await;
            summary.add(path, &outcome);
        }

        if summary.is_nothing_new() {
            tracing::info!(
                files = summary.discovered,
                "Nothing new, every file was already ingested"
            );
        } else {
            tracing::info!(
                discovered = summary.discovered,
                ingested = summary.ingested,
                skipped_existing = summary.skipped_existing,
                skipped_empty = summary.skipped_empty,
                failed = summary.failed.len(),
                segments = summary.segments_written,
                "Ingestion finished"
            );
        }

        Ok(summary)
    }

    async fn process_file(&self, path: &Path) -> FileOutcome {
        match self.try_process_file(path).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let error = format!("{e:#}");
                tracing::error!(%error, "Failed to ingest file, will retry next run");
                FileOutcome::Failed { error }
            }
        }
    }

    async fn try_process_file(&self, path: &Path) -> Result<FileOutcome> {
        let fingerprint = fingerprint_file(path).await?;

        if self.ledger.contains(&fingerprint).await? {
            tracing::info!(%fingerprint, "Already ingested, skipping");
            return Ok(FileOutcome::SkippedExisting);
        }

        tracing::info!(%fingerprint, "Ingesting file");
        let documents = self
            .loader
            .load(path)
            .await
            .context("Failed to load file")?;
        if documents.is_empty() {
            tracing::warn!("File loaded no documents, skipping");
            return Ok(FileOutcome::Empty);
        }

        let segments = self.chunker.split_documents(&documents);
        if segments.is_empty() {
            tracing::warn!(documents = documents.len(), "File has no text to split, skipping");
            return Ok(FileOutcome::Empty);
        }

        let count = segments.len();
        self.gateway.embed_and_store(segments).await?;
        self.ledger
            .record(&fingerprint)
            .await
            .context("Segments were stored but the fingerprint could not be recorded")?;

        tracing::info!(segments = count, "File ingested");
        Ok(FileOutcome::Ingested { segments: count })
    }
}
