//! Document conversion port.
//!
//! The rendering engine is an external collaborator. Implementations open the
//! input, render it in the target format and write the result to the given
//! destination; all three failure points surface as [`ConversionError`].

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors produced while converting a document.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The input document could not be opened.
    #[error("failed to open input document {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The engine could not be started.
    #[error("conversion engine '{engine}' could not be started: {source}")]
    EngineUnavailable {
        engine: String,
        #[source]
        source: io::Error,
    },

    /// The engine ran but reported failure.
    #[error("conversion engine failed ({status}): {detail}")]
    EngineFailed { status: String, detail: String },

    /// The rendered output could not be written to the destination.
    #[error("failed to write output document {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The conversion exceeded the configured timeout.
    #[error("conversion timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

/// Converts a source document into the target format.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Convert `input` and write the result to `output`.
    ///
    /// On success `output` exists and holds the complete rendering. The call
    /// has no timeout of its own.
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConversionError>;
}
