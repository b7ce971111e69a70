//! LibreOffice-backed implementation of the `DocumentConverter` port.
//!
//! Runs `soffice --headless --convert-to pdf` against a scratch directory that
//! sits next to the destination, then moves the produced file into place. Each
//! conversion gets its own LibreOffice profile so concurrent requests do not
//! contend for the user installation lock.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use async_trait::async_trait;
use docconv_core::{ConversionError, DocumentConverter, TARGET_FORMAT};
use tokio::fs;
use tokio::process::Command;
use tracing::debug;

/// Binary looked up on `PATH` when none is configured.
pub const DEFAULT_SOFFICE_BINARY: &str = "soffice";

/// Longest engine diagnostic carried in an error.
const MAX_DETAIL_LEN: usize = 512;

/// Converter that shells out to LibreOffice.
#[derive(Debug, Clone)]
pub struct SofficeConverter {
    binary: PathBuf,
}

impl Default for SofficeConverter {
    fn default() -> Self {
        Self::new(DEFAULT_SOFFICE_BINARY)
    }
}

impl SofficeConverter {
    /// Create a converter using the given `soffice` binary.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Ask the engine for its version string.
    pub async fn version(&self) -> Result<String, ConversionError> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| self.unavailable(source))?;

        if !output.status.success() {
            return Err(engine_failed(&output));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    fn build_command(&self, input: &Path, outdir: &Path, profile_url: &str) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--headless")
            .arg("--norestore")
            .arg(format!("-env:UserInstallation={profile_url}"))
            .arg("--convert-to")
            .arg(TARGET_FORMAT.extension)
            .arg("--outdir")
            .arg(outdir)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    fn unavailable(&self, source: io::Error) -> ConversionError {
        ConversionError::EngineUnavailable {
            engine: self.binary.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl DocumentConverter for SofficeConverter {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConversionError> {
        let open_error = |source| ConversionError::Open {
            path: input.to_path_buf(),
            source,
        };
        let write_error = |source| ConversionError::Write {
            path: output.to_path_buf(),
            source,
        };

        let meta = fs::metadata(input).await.map_err(open_error)?;
        if !meta.is_file() {
            return Err(open_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }
        let stem = input
            .file_stem()
            .ok_or_else(|| open_error(io::Error::new(io::ErrorKind::InvalidInput, "no file name")))?;

        let parent = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let scratch = tempfile::Builder::new()
            .prefix(".convert-")
            .tempdir_in(parent)
            .map_err(write_error)?;
        let scratch_root = fs::canonicalize(scratch.path()).await.map_err(write_error)?;
        let outdir = scratch_root.join("out");
        let profile = scratch_root.join("profile");
        fs::create_dir(&outdir).await.map_err(write_error)?;

        let profile_url = url::Url::from_directory_path(&profile)
            .map_err(|()| {
                write_error(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "profile path is not absolute",
                ))
            })?
            .to_string();

        let mut cmd = self.build_command(input, &outdir, &profile_url);
        debug!(target: "docconv.convert", command = ?cmd.as_std(), "Spawning conversion engine");

        let result = cmd.output().await.map_err(|source| self.unavailable(source))?;
        if !result.status.success() {
            return Err(engine_failed(&result));
        }

        let mut produced_name = stem.to_os_string();
        produced_name.push(".");
        produced_name.push(TARGET_FORMAT.extension);
        let produced = outdir.join(produced_name);

        // soffice exits 0 even when it could not load the source
        if !fs::try_exists(&produced).await.unwrap_or(false) {
            let mut err = engine_failed(&result);
            if let ConversionError::EngineFailed { detail, .. } = &mut err {
                if detail.is_empty() {
                    *detail = "engine produced no output".to_string();
                }
            }
            return Err(err);
        }

        fs::rename(&produced, output).await.map_err(write_error)?;
        Ok(())
    }
}

fn engine_failed(output: &Output) -> ConversionError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let text = if stderr.trim().is_empty() {
        stdout.trim()
    } else {
        stderr.trim()
    };

    ConversionError::EngineFailed {
        status: output.status.to_string(),
        detail: truncate(text, MAX_DETAIL_LEN),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}
