//! `docconv` command-line interface.
//!
//! - `serve` runs the HTTP conversion service
//! - `convert` converts a single local document
//! - `check-deps` verifies the conversion engine is runnable
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by main.rs
use dotenvy as _;

pub mod commands;
pub mod handlers;
pub mod logging;
pub mod parser;

pub use commands::{Commands, ServeArgs};
pub use logging::init_logging;
pub use parser::Cli;
