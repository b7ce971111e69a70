//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Upload-convert-download service for DOCX documents.
#[derive(Parser)]
#[command(name = "docconv")]
#[command(about = "Convert DOCX documents to PDF over HTTP")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
