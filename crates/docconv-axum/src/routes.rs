//! Route definitions and router construction.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::bootstrap::AxumContext;
use crate::handlers;
use crate::state::AppState;

/// Room for multipart boundaries, part headers and small extra fields.
pub const MULTIPART_ENVELOPE: u64 = 64 * 1024;

/// Create the main router.
pub fn create_router(ctx: AxumContext) -> Router {
    let body_limit = body_limit(ctx.service.config().max_file_size);
    let state: AppState = Arc::new(ctx);

    Router::new()
        .route("/", get(handlers::home::index))
        .route(
            "/convert",
            post(handlers::convert::convert).fallback(handlers::method_not_allowed),
        )
        .route("/download/", get(handlers::download::missing_name))
        .route("/download/{*filename}", get(handlers::download::download))
        .route("/health", get(handlers::health::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn body_limit(max_file_size: u64) -> usize {
    usize::try_from(max_file_size.saturating_add(MULTIPART_ENVELOPE)).unwrap_or(usize::MAX)
}
