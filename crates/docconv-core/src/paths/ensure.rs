//! Directory creation and verification utilities.

use std::fs::{self, DirBuilder, OpenOptions};
use std::io::Write;
use std::path::Path;

use tracing::debug;

use super::error::PathError;
use crate::config::ServiceConfig;

/// Permission bits for created directories: owner rwx, group/other r-x.
pub const DIRECTORY_MODE: u32 = 0o755;

/// Create (if needed) and verify the upload and output directories.
pub fn ensure_service_dirs(config: &ServiceConfig) -> Result<(), PathError> {
    ensure_directory(&config.upload_dir)?;
    ensure_directory(&config.output_dir)?;
    debug!(
        target: "docconv.paths",
        upload_dir = %config.upload_dir.display(),
        output_dir = %config.output_dir.display(),
        "Storage directories ready"
    );
    Ok(())
}

/// Create `path` (and parents) with [`DIRECTORY_MODE`] if missing, then
/// verify it is a writable directory.
pub fn ensure_directory(path: &Path) -> Result<(), PathError> {
    if path.as_os_str().is_empty() {
        return Err(PathError::EmptyPath);
    }

    if path.exists() {
        if !path.is_dir() {
            return Err(PathError::NotADirectory(path.to_path_buf()));
        }
    } else {
        create_dir(path).map_err(|e| PathError::CreateFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    }

    verify_writable(path)?;
    Ok(())
}

fn create_dir(path: &Path) -> std::io::Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIRECTORY_MODE);
    }
    builder.create(path)
}

/// Verify a directory is writable by attempting to create a test file.
pub fn verify_writable(path: &Path) -> Result<(), PathError> {
    let test_file = path.join(".docconv_write_test");
    let result = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&test_file);

    match result {
        Ok(mut file) => {
            file.write_all(b"test")
                .map_err(|e| PathError::NotWritable {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            drop(file);
            let _ = fs::remove_file(&test_file);
            Ok(())
        }
        Err(err) => Err(PathError::NotWritable {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }),
    }
}
