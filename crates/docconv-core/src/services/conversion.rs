//! Conversion service implementation.
//!
//! Owns the upload → convert → locate lifecycle on the filesystem. It composes
//! over the `DocumentConverter` port for rendering and a `Clock` for naming;
//! the HTTP adapter only moves bytes in and out.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::fs;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::formats::{DocumentFormat, SOURCE_FORMAT, TARGET_FORMAT};
use crate::naming::{GeneratedNames, validate_download_name};
use crate::ports::{ConversionError, DocumentConverter};
use crate::upload::UploadWriter;

/// An accepted upload with its derived on-disk locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedUpload {
    /// Filename as sent by the client.
    pub original_filename: String,
    /// Derived upload and artifact names.
    pub names: GeneratedNames,
    /// Where the upload is written.
    pub upload_path: PathBuf,
    /// Where the converted artifact will be written.
    pub artifact_path: PathBuf,
}

/// A converted document ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Filename within the output directory.
    pub name: String,
    /// Full path of the artifact.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
}

/// Orchestrates staging, conversion and artifact lookup.
pub struct ConversionService {
    config: ServiceConfig,
    converter: Arc<dyn DocumentConverter>,
    clock: Arc<dyn Clock>,
    in_flight: Mutex<HashSet<PathBuf>>,
}

/// Marks an upload and its artifact as busy until dropped.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<PathBuf>>,
    paths: [PathBuf; 2],
}

impl<'a> InFlightGuard<'a> {
    fn enter(set: &'a Mutex<HashSet<PathBuf>>, staged: &StagedUpload) -> Self {
        let paths = [staged.upload_path.clone(), staged.artifact_path.clone()];
        set.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(paths.iter().cloned());
        Self { set, paths }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut set = self.set.lock().unwrap_or_else(PoisonError::into_inner);
        for path in &self.paths {
            set.remove(path);
        }
    }
}

impl ConversionService {
    /// Create a service using the system clock.
    pub fn new(config: ServiceConfig, converter: Arc<dyn DocumentConverter>) -> Self {
        Self {
            config,
            converter,
            clock: Arc::new(SystemClock),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Replace the clock used for timestamped names.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The configuration this service was built with.
    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Whether `path` is the upload or artifact of a conversion in progress.
    pub fn is_converting(&self, path: &Path) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(path)
    }

    /// Format served on download.
    pub const fn target_format(&self) -> DocumentFormat {
        TARGET_FORMAT
    }

    /// Validate the client filename and derive where the upload and artifact go.
    ///
    /// Nothing is written to disk.
    pub fn stage(&self, original_filename: &str) -> Result<StagedUpload, ServiceError> {
        if !SOURCE_FORMAT.matches(original_filename) {
            return Err(ServiceError::UnsupportedFormat(SOURCE_FORMAT.extension));
        }

        let names = GeneratedNames::derive(
            original_filename,
            self.clock.now(),
            SOURCE_FORMAT,
            TARGET_FORMAT,
        );
        Ok(StagedUpload {
            original_filename: original_filename.to_string(),
            upload_path: self.config.upload_dir.join(&names.upload),
            artifact_path: self.config.output_dir.join(&names.artifact),
            names,
        })
    }

    /// Open a size-bounded writer for the staged upload.
    pub async fn open_upload(&self, staged: &StagedUpload) -> Result<UploadWriter, ServiceError> {
        Ok(UploadWriter::create(&staged.upload_path, self.config.max_file_size).await?)
    }

    /// Convert a fully written upload.
    ///
    /// On success the upload is removed. On failure it is left in place.
    pub async fn convert(&self, staged: &StagedUpload) -> Result<Artifact, ServiceError> {
        debug!(
            target: "docconv.convert",
            input = %staged.upload_path.display(),
            output = %staged.artifact_path.display(),
            "Starting conversion"
        );

        if let Err(e) = self.run_converter(staged).await {
            warn!(
                target: "docconv.convert",
                original = %staged.original_filename,
                upload = %staged.upload_path.display(),
                error = %e,
                "Conversion failed, upload left in place"
            );
            return Err(e.into());
        }

        if let Err(e) = fs::remove_file(&staged.upload_path).await {
            warn!(
                target: "docconv.convert",
                upload = %staged.upload_path.display(),
                error = %e,
                "Failed to remove converted upload"
            );
        }

        let size = fs::metadata(&staged.artifact_path)
            .await
            .map(|m| m.len())
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        info!(
            target: "docconv.convert",
            original = %staged.original_filename,
            artifact = %staged.names.artifact,
            size,
            "Conversion complete"
        );

        Ok(Artifact {
            name: staged.names.artifact.clone(),
            path: staged.artifact_path.clone(),
            size,
        })
    }

    async fn run_converter(&self, staged: &StagedUpload) -> Result<(), ConversionError> {
        let _busy = InFlightGuard::enter(&self.in_flight, staged);
        let conversion = self
            .converter
            .convert(&staged.upload_path, &staged.artifact_path);

        match self.config.conversion_timeout {
            Some(limit) => tokio::time::timeout(limit, conversion)
                .await
                .map_err(|_| ConversionError::TimedOut(limit))?,
            None => conversion.await,
        }
    }

    /// Resolve a requested download name to an existing artifact path.
    ///
    /// Traversal checks run before any filesystem access.
    pub async fn locate_artifact(&self, name: &str) -> Result<PathBuf, ServiceError> {
        let name = validate_download_name(name)?;
        let path = self.config.output_dir.join(name);

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(ServiceError::NotFound(name.to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ServiceError::NotFound(name.to_string()))
            }
            Err(e) => Err(ServiceError::Storage(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::naming::DownloadNameError;
    use crate::ports::MockDocumentConverter;
    use chrono::NaiveDate;
    use std::sync::OnceLock;
    use std::time::Duration;
    use tempfile::TempDir;

    fn fixed_clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        ))
    }

    fn service_in(temp: &TempDir, converter: MockDocumentConverter) -> ConversionService {
        let config = ServiceConfig::new()
            .with_dirs(temp.path().join("uploads"), temp.path().join("output"));
        std::fs::create_dir_all(&config.upload_dir).unwrap();
        std::fs::create_dir_all(&config.output_dir).unwrap();
        ConversionService::new(config, Arc::new(converter)).with_clock(fixed_clock())
    }

    async fn write_upload(service: &ConversionService, staged: &StagedUpload) {
        let mut writer = service.open_upload(staged).await.unwrap();
        writer.write_chunk(b"PK\x03\x04 fake docx").await.unwrap();
        writer.finish().await.unwrap();
    }

    #[test]
    fn stage_derives_timestamped_paths() {
        let temp = TempDir::new().unwrap();
        let service = service_in(&temp, MockDocumentConverter::new());

        let staged = service.stage("report.docx").unwrap();
        assert_eq!(staged.names.upload, "report_20240101_100000.docx");
        assert_eq!(staged.names.artifact, "report_20240101_100000.pdf");
        assert_eq!(
            staged.upload_path,
            temp.path().join("uploads/report_20240101_100000.docx")
        );
        assert_eq!(
            staged.artifact_path,
            temp.path().join("output/report_20240101_100000.pdf")
        );
    }

    #[test]
    fn stage_rejects_wrong_extension_without_writing() {
        let temp = TempDir::new().unwrap();
        let service = service_in(&temp, MockDocumentConverter::new());

        let err = service.stage("notes.txt").unwrap_err();
        assert!(matches!(err, ServiceError::UnsupportedFormat("docx")));
        assert_eq!(err.to_string(), "Only DOCX files are allowed");
        assert_eq!(
            std::fs::read_dir(temp.path().join("uploads")).unwrap().count(),
            0
        );
    }

    #[tokio::test]
    async fn convert_success_removes_upload_and_returns_artifact() {
        let temp = TempDir::new().unwrap();
        let mut converter = MockDocumentConverter::new();
        converter
            .expect_convert()
            .times(1)
            .returning(|_input: &Path, output: &Path| {
                std::fs::write(output, b"%PDF-1.4").unwrap();
                Ok(())
            });
        let service = service_in(&temp, converter);

        let staged = service.stage("report.docx").unwrap();
        write_upload(&service, &staged).await;

        let artifact = service.convert(&staged).await.unwrap();
        assert_eq!(artifact.name, "report_20240101_100000.pdf");
        assert_eq!(artifact.size, 8);
        assert!(artifact.path.exists());
        assert!(!staged.upload_path.exists());
    }

    #[tokio::test]
    async fn convert_failure_keeps_upload() {
        let temp = TempDir::new().unwrap();
        let mut converter = MockDocumentConverter::new();
        converter.expect_convert().returning(|_, _| {
            Err(ConversionError::EngineFailed {
                status: "exit status: 1".to_string(),
                detail: "source file could not be loaded".to_string(),
            })
        });
        let service = service_in(&temp, converter);

        let staged = service.stage("report.docx").unwrap();
        write_upload(&service, &staged).await;

        let err = service.convert(&staged).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conversion(_)));
        assert!(
            err.to_string()
                .contains("source file could not be loaded"),
            "unexpected message: {err}"
        );
        assert!(staged.upload_path.exists());
        assert!(!staged.artifact_path.exists());
    }

    #[tokio::test]
    async fn paths_are_busy_only_while_converting() {
        struct Recording {
            service: OnceLock<Arc<ConversionService>>,
            seen: Mutex<Vec<bool>>,
        }

        #[async_trait::async_trait]
        impl DocumentConverter for Recording {
            async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConversionError> {
                let service = self.service.get().unwrap();
                let mut seen = self.seen.lock().unwrap();
                seen.push(service.is_converting(input));
                seen.push(service.is_converting(output));
                std::fs::write(output, b"%PDF").unwrap();
                Ok(())
            }
        }

        let temp = TempDir::new().unwrap();
        let config = ServiceConfig::new()
            .with_dirs(temp.path().join("uploads"), temp.path().join("output"));
        std::fs::create_dir_all(&config.upload_dir).unwrap();
        std::fs::create_dir_all(&config.output_dir).unwrap();
        let recording = Arc::new(Recording {
            service: OnceLock::new(),
            seen: Mutex::new(Vec::new()),
        });
        let service = Arc::new(
            ConversionService::new(config, recording.clone()).with_clock(fixed_clock()),
        );
        assert!(recording.service.set(Arc::clone(&service)).is_ok());

        let staged = service.stage("report.docx").unwrap();
        write_upload(&service, &staged).await;
        assert!(!service.is_converting(&staged.upload_path));

        service.convert(&staged).await.unwrap();
        assert_eq!(*recording.seen.lock().unwrap(), [true, true]);
        assert!(!service.is_converting(&staged.upload_path));
        assert!(!service.is_converting(&staged.artifact_path));
    }

    #[tokio::test(start_paused = true)]
    async fn convert_honours_timeout() {
        struct Stalled;

        #[async_trait::async_trait]
        impl DocumentConverter for Stalled {
            async fn convert(&self, _: &Path, _: &Path) -> Result<(), ConversionError> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }

        let temp = TempDir::new().unwrap();
        let config = ServiceConfig::new()
            .with_dirs(temp.path().join("uploads"), temp.path().join("output"))
            .with_conversion_timeout(Some(Duration::from_secs(30)));
        let service = ConversionService::new(config, Arc::new(Stalled)).with_clock(fixed_clock());

        let staged = service.stage("slow.docx").unwrap();
        let err = service.convert(&staged).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Conversion(ConversionError::TimedOut(_))
        ));
    }

    #[tokio::test]
    async fn locate_artifact_checks_names_before_disk() {
        let temp = TempDir::new().unwrap();
        let service = service_in(&temp, MockDocumentConverter::new());

        let err = service.locate_artifact("../uploads/x.docx").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidDownloadName(DownloadNameError::Traversal)
        ));

        let err = service.locate_artifact("").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidDownloadName(DownloadNameError::Empty)
        ));
    }

    #[tokio::test]
    async fn locate_artifact_reports_missing_and_directories_as_not_found() {
        let temp = TempDir::new().unwrap();
        let service = service_in(&temp, MockDocumentConverter::new());
        std::fs::create_dir(temp.path().join("output/.convert-scratch")).unwrap();

        assert!(matches!(
            service.locate_artifact("missing.pdf").await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.locate_artifact(".convert-scratch").await,
            Err(ServiceError::NotFound(_))
        ));

        std::fs::write(temp.path().join("output/present.pdf"), b"%PDF").unwrap();
        let path = service.locate_artifact("present.pdf").await.unwrap();
        assert_eq!(path, temp.path().join("output/present.pdf"));
    }
}
