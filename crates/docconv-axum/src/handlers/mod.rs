//! HTTP request handlers for the Axum web server.
//!
//! Handlers are thin: validation, naming and conversion live in
//! `ConversionService`.

pub mod convert;
pub mod download;
pub mod health;
pub mod home;

use crate::error::HttpError;

/// Fallback for methods a route does not accept.
pub async fn method_not_allowed() -> HttpError {
    HttpError::MethodNotAllowed { allow: "POST" }
}
