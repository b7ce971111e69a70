//! Core domain types and ports for the docconv document conversion service.
//!
//! - [`config`] - the explicit service configuration
//! - [`naming`] - timestamped filenames and download name checks
//! - [`upload`] - size-bounded upload staging
//! - [`ports`] - the `DocumentConverter` port
//! - [`services`] - the conversion lifecycle
//! - [`paths`] - storage directory setup
#![deny(unused_crate_dependencies)]

pub mod clock;
pub mod config;
pub mod error;
pub mod formats;
pub mod naming;
pub mod paths;
pub mod ports;
pub mod services;
pub mod upload;

// Re-export commonly used types for convenience
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, ServiceConfig};
pub use error::ServiceError;
pub use formats::{DocumentFormat, SOURCE_FORMAT, TARGET_FORMAT};
pub use naming::{DownloadNameError, GeneratedNames, validate_download_name};
pub use paths::{PathError, ensure_service_dirs};
pub use ports::{ConversionError, DocumentConverter};
pub use services::{Artifact, ConversionService, StagedUpload};
pub use upload::{UploadError, UploadWriter};
