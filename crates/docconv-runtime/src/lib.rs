//! Runtime adapters for docconv.
//!
//! - [`soffice`] - LibreOffice implementation of the `DocumentConverter` port
//! - [`retention`] - post-download artifact removal
//! - [`sweeper`] - periodic cleanup of expired uploads and artifacts
#![deny(unused_crate_dependencies)]

// Only the unix-gated engine tests use it
#[cfg(test)]
use tokio_test as _;

pub mod retention;
pub mod soffice;
pub mod sweeper;

pub use retention::RetentionScheduler;
pub use soffice::{DEFAULT_SOFFICE_BINARY, SofficeConverter};
pub use sweeper::{ArtifactSweeper, SweepReport};

// Re-exported so adapters share one token/tracker type
pub use tokio_util::sync::CancellationToken;
pub use tokio_util::task::TaskTracker;
