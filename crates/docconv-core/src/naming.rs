//! Filename derivation for uploads and artifacts, and download name checks.
//!
//! Generated names follow `{base}_{YYYYMMDD_HHMMSS}.{ext}`. The timestamp has
//! second resolution, so two uploads with the same base name in the same
//! second map to the same paths.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::formats::DocumentFormat;

/// Timestamp layout embedded in generated filenames.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Base name used when the uploaded filename has no usable stem.
const FALLBACK_BASE: &str = "document";

/// The pair of filenames derived from one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedNames {
    /// Sanitized base name shared by both files.
    pub base: String,
    /// Name of the staged upload, e.g. `report_20240101_100000.docx`.
    pub upload: String,
    /// Name of the converted artifact, e.g. `report_20240101_100000.pdf`.
    pub artifact: String,
}

impl GeneratedNames {
    /// Derive upload and artifact names from the client-supplied filename.
    pub fn derive(
        original_filename: &str,
        at: NaiveDateTime,
        source: DocumentFormat,
        target: DocumentFormat,
    ) -> Self {
        let base = base_name(original_filename);
        let stamp = at.format(TIMESTAMP_FORMAT);
        Self {
            upload: format!("{base}_{stamp}.{}", source.extension),
            artifact: format!("{base}_{stamp}.{}", target.extension),
            base,
        }
    }
}

/// Reduce a client-supplied filename to a safe base name.
///
/// Drops any directory components and the last extension, replaces characters
/// other than letters, digits, `.`, `_`, `-` and space with `_`, and replaces
/// every `.` when the result would contain `..`.
pub fn base_name(original_filename: &str) -> String {
    let file = original_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);

    let mut base: String = stem
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if base.contains("..") {
        base = base.replace('.', "_");
    }

    let trimmed = base.trim();
    if trimmed.is_empty() {
        FALLBACK_BASE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Reasons a requested download name is refused before touching the disk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadNameError {
    #[error("Filename required")]
    Empty,

    #[error("Invalid filename")]
    Traversal,
}

/// Check a requested download name.
///
/// Only substring checks are applied: no canonicalization, no symlink
/// resolution, other metacharacters pass.
pub fn validate_download_name(name: &str) -> Result<&str, DownloadNameError> {
    if name.is_empty() {
        return Err(DownloadNameError::Empty);
    }
    if name.contains("..") || name.contains(['/', '\\']) {
        return Err(DownloadNameError::Traversal);
    }
    Ok(name)
}
