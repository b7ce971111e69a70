//! Check dependencies handler.

use std::path::Path;

use anyhow::{Result, bail};
use docconv_runtime::SofficeConverter;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Probe the conversion engine and report whether it can run.
pub async fn execute(soffice: &Path) -> Result<()> {
    println!("{BOLD}Checking conversion engine...{RESET}\n");

    match SofficeConverter::new(soffice).version().await {
        Ok(version) => {
            println!("{GREEN}✓{RESET} {:<12} {version}", soffice.display());
            Ok(())
        }
        Err(e) => {
            println!("{RED}✗{RESET} {:<12} {e}", soffice.display());
            println!();
            println!("Install LibreOffice (e.g. `apt install libreoffice-writer`)");
            println!("or pass its location with --soffice / DOCCONV_SOFFICE.");
            bail!("conversion engine is not available")
        }
    }
}
