//! Core services - the application's business logic layer.
//!
//! Services orchestrate between ports and domain logic. They don't know
//! about concrete implementations.

mod conversion;

pub use conversion::{Artifact, ConversionService, StagedUpload};
