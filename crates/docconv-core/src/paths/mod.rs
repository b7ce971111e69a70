//! Storage directory setup for uploads and artifacts.
//!
//! Returns `PathError` for every failure; the composition root decides
//! whether a failure is fatal.

mod ensure;
mod error;

pub use ensure::{DIRECTORY_MODE, ensure_directory, ensure_service_dirs, verify_writable};
pub use error::PathError;
