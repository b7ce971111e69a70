//! Service-level error type.
//!
//! Adapters map these onto their own surfaces (HTTP status codes, CLI exit
//! codes). Messages are written to be shown to the caller as-is.

use thiserror::Error;

use crate::naming::DownloadNameError;
use crate::ports::ConversionError;
use crate::upload::UploadError;

/// Errors returned by [`crate::services::ConversionService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The uploaded file does not carry the accepted extension.
    #[error("Only {} files are allowed", .0.to_ascii_uppercase())]
    UnsupportedFormat(&'static str),

    /// The requested download name failed the traversal checks.
    #[error(transparent)]
    InvalidDownloadName(#[from] DownloadNameError),

    /// The requested artifact does not exist.
    #[error("File not found")]
    NotFound(String),

    /// Staging the upload failed.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// The conversion engine failed.
    #[error("Error converting file: {0}")]
    Conversion(#[from] ConversionError),

    /// Filesystem failure outside of upload staging.
    #[error("Storage error: {0}")]
    Storage(String),
}
