//! Shared fixtures for the router integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use chrono::NaiveDate;
use docconv_axum::{AxumContext, bootstrap_with, create_router};
use docconv_core::{ConversionError, ConversionService, DocumentConverter, FixedClock, ServiceConfig};
use tempfile::TempDir;

pub const BOUNDARY: &str = "docconv-test-boundary";

/// Bytes written by [`FakeConverter`].
pub const FAKE_PDF: &[u8] = b"%PDF-1.4\n% fake artifact\n";

/// Writes a fixed PDF payload to the destination.
pub struct FakeConverter;

#[async_trait]
impl DocumentConverter for FakeConverter {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConversionError> {
        tokio::fs::metadata(input)
            .await
            .map_err(|source| ConversionError::Open {
                path: input.to_path_buf(),
                source,
            })?;
        tokio::fs::write(output, FAKE_PDF)
            .await
            .map_err(|source| ConversionError::Write {
                path: output.to_path_buf(),
                source,
            })
    }
}

/// Always fails like an engine that cannot read its input.
pub struct FailingConverter;

#[async_trait]
impl DocumentConverter for FailingConverter {
    async fn convert(&self, _: &Path, _: &Path) -> Result<(), ConversionError> {
        Err(ConversionError::EngineFailed {
            status: "exit status: 1".to_string(),
            detail: "source file could not be loaded".to_string(),
        })
    }
}

/// A router over temporary storage, with the clock fixed at 2024-01-01 10:00:00.
pub struct TestApp {
    pub temp: TempDir,
    pub ctx: AxumContext,
    pub router: Router,
}

impl TestApp {
    pub fn new(converter: Arc<dyn DocumentConverter>) -> Self {
        Self::with_config(converter, |c| c)
    }

    pub fn with_config(
        converter: Arc<dyn DocumentConverter>,
        adjust: impl FnOnce(ServiceConfig) -> ServiceConfig,
    ) -> Self {
        let temp = TempDir::new().unwrap();
        let config = adjust(
            ServiceConfig::new()
                .with_dirs(temp.path().join("uploads"), temp.path().join("output"))
                .with_artifact_ttl(None),
        );
        let clock = FixedClock(
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        );
        let service = ConversionService::new(config, converter).with_clock(Arc::new(clock));
        let ctx = bootstrap_with(service).unwrap();
        let router = create_router(ctx.clone());

        Self { temp, ctx, router }
    }

    pub fn upload_dir(&self) -> std::path::PathBuf {
        self.temp.path().join("uploads")
    }

    pub fn output_dir(&self) -> std::path::PathBuf {
        self.temp.path().join("output")
    }
}

/// Names of the entries in `dir`.
pub fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Build a multipart body with a single file field.
pub fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// `POST /convert` with the given multipart body.
pub fn convert_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/convert")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// `GET` request for `uri`.
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
