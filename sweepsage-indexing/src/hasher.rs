//! Content fingerprints for ingestion deduplication
use std::path::Path;

use sha2::{Digest, Sha256};
use sweepsage_core::Fingerprint;
use thiserror::Error;
use tokio::io::AsyncReadExt as _;

/// Files are read in chunks of this many bytes
const READ_CHUNK_SIZE: usize = 4096;

#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("path is not a file: {0}")]
    NotAFile(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Computes the sha256 fingerprint of a file's bytes.
///
/// The file is streamed in bounded chunks, so arbitrarily large files can be fingerprinted.
///
/// # Errors
///
/// Fails if the path does not exist, is not a regular file, or cannot be read.
pub async fn fingerprint_file(path: impl AsRef<Path>) -> Result<Fingerprint, FingerprintError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let io_error = |source| FingerprintError::Io {
        path: display.clone(),
        source,
    };

    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(FingerprintError::NotFound(path.display().to_string()));
        }
        Err(e) => return Err(io_error(e)),
    };
    if !metadata.is_file() {
        return Err(FingerprintError::NotAFile(path.display().to_string()));
    }

    let mut file = tokio::fs::File::open(path).await.map_err(io_error)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0_u8; READ_CHUNK_SIZE];
    loop {
        let read = file.read(&mut buffer).await.map_err(io_error)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(Fingerprint::from_digest(hasher.finalize()))
}
