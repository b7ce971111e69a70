//! One-shot local conversion.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use docconv_core::{DocumentConverter, SOURCE_FORMAT, TARGET_FORMAT};
use docconv_runtime::SofficeConverter;
use tracing::info;

/// Convert `input` to PDF next to it, or at `output` when given.
pub async fn execute(input: &Path, output: Option<&Path>, soffice: &Path) -> Result<()> {
    let output = resolve_output(input, output)?;
    if !tokio::fs::try_exists(input).await.unwrap_or(false) {
        bail!("input file not found: {}", input.display());
    }

    SofficeConverter::new(soffice)
        .convert(input, &output)
        .await
        .with_context(|| format!("failed to convert {}", input.display()))?;

    info!(input = %input.display(), output = %output.display(), "Converted");
    println!("{}", output.display());
    Ok(())
}

fn resolve_output(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let name = input.to_string_lossy();
    if !SOURCE_FORMAT.matches(&name) {
        bail!(
            "Only {} files are allowed: {}",
            SOURCE_FORMAT.extension.to_ascii_uppercase(),
            input.display()
        );
    }

    Ok(output.map_or_else(
        || input.with_extension(TARGET_FORMAT.extension),
        Path::to_path_buf,
    ))
}
