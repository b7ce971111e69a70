//! Size-bounded writer for staged uploads.
//!
//! The HTTP adapter feeds multipart chunks into an [`UploadWriter`]. The limit
//! is enforced before each chunk is written, so the file on disk never exceeds
//! it; callers remove the partial file with [`UploadWriter::discard`] on any
//! failure.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::warn;

/// Errors raised while staging an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The upload exceeded the configured limit.
    #[error("File too large (limit is {limit} bytes)")]
    TooLarge { limit: u64 },

    /// The staged file could not be created or written.
    #[error("Error saving file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Streams an upload to disk while enforcing a byte limit.
#[derive(Debug)]
pub struct UploadWriter {
    file: BufWriter<File>,
    path: PathBuf,
    written: u64,
    limit: u64,
}

impl UploadWriter {
    /// Create (or truncate) the staged file at `path`.
    pub async fn create(path: impl Into<PathBuf>, limit: u64) -> Result<Self, UploadError> {
        let path = path.into();
        let file = File::create(&path).await.map_err(|source| UploadError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            file: BufWriter::new(file),
            path,
            written: 0,
            limit,
        })
    }

    /// Append a chunk, failing without writing it if the limit would be exceeded.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), UploadError> {
        let next = u64::try_from(chunk.len())
            .ok()
            .and_then(|len| self.written.checked_add(len))
            .filter(|total| *total <= self.limit)
            .ok_or(UploadError::TooLarge { limit: self.limit })?;

        self.file
            .write_all(chunk)
            .await
            .map_err(|source| UploadError::Io {
                path: self.path.clone(),
                source,
            })?;
        self.written = next;
        Ok(())
    }

    /// Bytes accepted so far.
    pub const fn written(&self) -> u64 {
        self.written
    }

    /// Flush and close the file, returning the total size.
    ///
    /// The file is removed if the flush fails.
    pub async fn finish(mut self) -> Result<u64, UploadError> {
        if let Err(source) = self.file.flush().await {
            let path = self.path.clone();
            self.discard().await;
            return Err(UploadError::Io { path, source });
        }
        Ok(self.written)
    }

    /// Close and remove the partially written file.
    pub async fn discard(self) {
        let Self { file, path, .. } = self;
        drop(file);
        if let Err(e) = fs::remove_file(&path).await {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(
                    target: "docconv.upload",
                    path = %path.display(),
                    error = %e,
                    "Failed to remove partial upload"
                );
            }
        }
    }
}
