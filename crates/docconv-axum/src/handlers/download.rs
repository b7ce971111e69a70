//! Artifact download handler.

use std::io;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::Response;
use docconv_core::DownloadNameError;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::info;

use crate::error::HttpError;
use crate::state::AppState;

/// Stream an artifact as an attachment and schedule its removal.
pub async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, HttpError> {
    let path = state.service.locate_artifact(&filename).await?;
    let file = File::open(&path).await.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => HttpError::NotFound("File not found".to_string()),
        _ => HttpError::Internal(format!("Error opening file: {e}")),
    })?;
    let len = file.metadata().await.ok().map(|m| m.len());

    let mut response = Response::builder()
        .header(header::CONTENT_TYPE, state.service.target_format().content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&filename),
        );
    if let Some(len) = len {
        response = response.header(header::CONTENT_LENGTH, len);
    }
    let response = response
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| HttpError::Internal(e.to_string()))?;

    let first = state.retention.schedule(path);
    info!(
        target: "docconv.download",
        artifact = %filename,
        size = ?len,
        removal_scheduled = first,
        "Serving artifact"
    );

    Ok(response)
}

/// `/download/` without a name.
pub async fn missing_name() -> HttpError {
    HttpError::BadRequest(DownloadNameError::Empty.to_string())
}

/// Attachment header with a quoted ASCII fallback and a UTF-8 `filename*`.
fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();
    if fallback == name {
        return format!("attachment; filename=\"{name}\"");
    }
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(name)
    )
}
