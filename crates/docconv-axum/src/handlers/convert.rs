//! Upload and convert handler.

use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Html;
use docconv_core::StagedUpload;
use tracing::{debug, info};

use crate::error::HttpError;
use crate::pages::{FILE_FIELD, success_page};
use crate::state::AppState;

const MISSING_FILE: &str = "Error retrieving file";
const TOO_LARGE: &str = "File too large";

/// Accept a multipart upload, convert it and link to the artifact.
pub async fn convert(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Html<String>, HttpError> {
    let mut multipart = multipart.map_err(|e| HttpError::BadRequest(e.body_text()))?;
    let mut staged: Option<StagedUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if staged.is_some() || field.name() != Some(FILE_FIELD) {
            debug!(target: "docconv.upload", field = ?field.name(), "Ignoring form field");
            drain(field).await?;
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_owned) else {
            drain(field).await?;
            continue;
        };

        staged = Some(save_upload(&state, &filename, field).await?);
    }

    let staged = staged.ok_or_else(|| HttpError::BadRequest(MISSING_FILE.to_string()))?;
    let artifact = state.service.convert(&staged).await?;

    Ok(Html(success_page(&artifact.name)))
}

/// Stream the file field to the upload directory under its generated name.
async fn save_upload(
    state: &AppState,
    filename: &str,
    mut field: Field<'_>,
) -> Result<StagedUpload, HttpError> {
    let staged = state.service.stage(filename)?;
    let mut writer = state.service.open_upload(&staged).await?;

    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                if let Err(e) = writer.write_chunk(&chunk).await {
                    writer.discard().await;
                    return Err(e.into());
                }
            }
            Ok(None) => break,
            Err(e) => {
                writer.discard().await;
                return Err(multipart_error(e));
            }
        }
    }

    let size = writer.finish().await?;
    info!(
        target: "docconv.upload",
        original = %staged.original_filename,
        upload = %staged.names.upload,
        size,
        "Upload saved"
    );
    Ok(staged)
}

async fn drain(mut field: Field<'_>) -> Result<(), HttpError> {
    while field.chunk().await.map_err(multipart_error)?.is_some() {}
    Ok(())
}

fn multipart_error(err: MultipartError) -> HttpError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        HttpError::BadRequest(TOO_LARGE.to_string())
    } else {
        HttpError::BadRequest(err.body_text())
    }
}
