//! Axum web adapter for docconv.
//!
//! Routes:
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | `/` | upload form |
//! | POST | `/convert` | upload, convert, link to the artifact |
//! | GET | `/download/{filename}` | stream an artifact and schedule its removal |
//! | GET | `/health` | liveness probe |
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Dev-dependencies used only by the integration tests
#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use chrono as _;
#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tower as _;

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod routes;
pub mod state;

// Re-export primary types
pub use bootstrap::{AxumContext, bootstrap, bootstrap_with, serve, serve_listener, start_server};
pub use error::HttpError;
pub use routes::create_router;
pub use state::AppState;
