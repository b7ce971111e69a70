//! Upload form.

use axum::response::Html;

use crate::pages::UPLOAD_FORM;

/// Serve the upload form.
pub async fn index() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}
