//! Append-only record of ingested fingerprints
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use sweepsage_core::{Fingerprint, IngestionLedger};
use tokio::{
    io::{AsyncReadExt as _, AsyncSeekExt as _, AsyncWriteExt as _},
    sync::Mutex,
};

/// An [`IngestionLedger`] backed by a plain text file with one fingerprint per line.
///
/// Every record is a single appended line, so a crash between two records leaves the file
/// readable. Nothing is ever removed; a file that is deleted from the data directory keeps its
/// entry.
#[derive(Debug)]
pub struct FileLedger {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the ledger file, and its parent directories, if missing
    async fn ensure_exists(&self) -> Result<()> {
        if fs_err::tokio::metadata(&self.path).await.is_ok() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs_err::tokio::create_dir_all(parent).await?;
        }
        tracing::debug!(path = %self.path.display(), "Creating ingestion ledger");
        fs_err::tokio::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl IngestionLedger for FileLedger {
    async fn contains(&self, fingerprint: &Fingerprint) -> Result<bool> {
        let _guard = self.lock.lock().await;
        self.ensure_exists().await?;

        let content = fs_err::tokio::read_to_string(&self.path)
            .await
            .context("Failed to read ingestion ledger")?;

        Ok(content
            .lines()
            .any(|line| line.trim() == fingerprint.as_str()))
    }

    async fn record(&self, fingerprint: &Fingerprint) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.ensure_exists().await?;

        let mut file = fs_err::tokio::OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .await?;

        // A torn previous append must not swallow this fingerprint
        let mut line = String::new();
        let len = file.metadata().await?.len();
        if len > 0 {
            let mut last = [0_u8; 1];
            file.seek(std::io::SeekFrom::Start(len - 1)).await?;
            file.read_exact(&mut last).await?;
            if last[0] != b'\n' {
                tracing::warn!(path = %self.path.display(), "Ledger did not end with a newline");
                line.push('\n');
            }
        }
        line.push_str(fingerprint.as_str());
        line.push('\n');

        file.write_all(line.as_bytes())
            .await
            .context("Failed to append to ingestion ledger")?;
        file.flush().await?;

        tracing::debug!(%fingerprint, "Recorded fingerprint");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use temp_dir::TempDir;

    #[tokio::test]
    async fn test_created_on_first_use() {
        let dir = TempDir::new().unwrap();
        let ledger = FileLedger::new(dir.child("store").join("md5_hex_store"));

        assert!(!ledger.contains(&"abc".into()).await.unwrap());
        assert!(ledger.path().is_file());
    }

    #[tokio::test]
    async fn test_record_then_contains() {
        let dir = TempDir::new().unwrap();
        let ledger = FileLedger::new(dir.child("ledger"));
        let fingerprint = Fingerprint::from("abc123");

        ledger.record(&fingerprint).await.unwrap();

        assert!(ledger.contains(&fingerprint).await.unwrap());
        assert!(!ledger.contains(&"def456".into()).await.unwrap());
    }

    #[tokio::test]
    async fn test_one_line_per_record_and_duplicates_are_harmless() {
        let dir = TempDir::new().unwrap();
        let ledger = FileLedger::new(dir.child("ledger"));

        ledger.record(&"aa".into()).await.unwrap();
        ledger.record(&"bb".into()).await.unwrap();
        ledger.record(&"aa".into()).await.unwrap();

        let content = std::fs::read_to_string(ledger.path()).unwrap();
        assert_eq!(content, "aa\nbb\naa\n");
        assert!(ledger.contains(&"aa".into()).await.unwrap());
    }

    #[tokio::test]
    async fn test_contains_ignores_surrounding_whitespace() {
        let dir = TempDir::new().unwrap();
        let path = dir.child("ledger");
        std::fs::write(&path, "  aa  \r\nbb\n").unwrap();

        let ledger = FileLedger::new(path);
        assert!(ledger.contains(&"aa".into()).await.unwrap());
        assert!(ledger.contains(&"bb".into()).await.unwrap());
    }

    #[tokio::test]
    async fn test_partial_last_line_keeps_both_fingerprints() {
        let dir = TempDir::new().unwrap();
        let path = dir.child("ledger");
        std::fs::write(&path, "aa").unwrap();

        let ledger = FileLedger::new(&path);
        ledger.record(&"bb".into()).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "aa\nbb\n");
        assert!(ledger.contains(&"aa".into()).await.unwrap());
        assert!(ledger.contains(&"bb".into()).await.unwrap());
    }

    #[tokio::test]
    async fn test_survives_reopening() {
        let dir = TempDir::new().unwrap();
        let path = dir.child("ledger");

        FileLedger::new(&path).record(&"aa".into()).await.unwrap();

        assert!(FileLedger::new(&path).contains(&"aa".into()).await.unwrap());
    }
}
