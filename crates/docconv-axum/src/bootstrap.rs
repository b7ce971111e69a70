//! Axum server bootstrap - the composition root.
//!
//! Validates configuration, prepares the storage directories, wires the
//! conversion service to the background tasks and runs the HTTP server until
//! shutdown. Background tasks share one cancellation token with the server so
//! nothing outlives it.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use docconv_core::{ConversionService, DocumentConverter, ServiceConfig, ensure_service_dirs};
use docconv_runtime::{ArtifactSweeper, CancellationToken, RetentionScheduler, TaskTracker};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::create_router;

/// Application context for the Axum adapter.
#[derive(Clone)]
pub struct AxumContext {
    /// Upload, conversion and artifact lookup.
    pub service: Arc<ConversionService>,
    /// Post-download artifact removal.
    pub retention: RetentionScheduler,
    /// Fires on shutdown; stops the server and every background task.
    pub cancel: CancellationToken,
    /// Tracks background tasks so shutdown can wait for them.
    pub tasks: TaskTracker,
}

impl AxumContext {
    /// The sweeper for this context's storage, or `None` when disabled.
    ///
    /// Artifacts awaiting retention and files of running conversions are
    /// protected from it.
    pub fn sweeper(&self) -> Option<ArtifactSweeper> {
        let service = Arc::clone(&self.service);
        let retention = self.retention.clone();
        ArtifactSweeper::from_config(service.config()).map(|sweeper| {
            sweeper.with_protected(move |path| {
                retention.is_scheduled(path) || service.is_converting(path)
            })
        })
    }
}

/// Bootstrap the server around the given converter, using the system clock.
pub fn bootstrap(
    config: ServiceConfig,
    converter: Arc<dyn DocumentConverter>,
) -> Result<AxumContext> {
    bootstrap_with(ConversionService::new(config, converter))
}

/// Bootstrap the server around an already constructed service.
///
/// Must be called from within a Tokio runtime when the sweeper is enabled.
pub fn bootstrap_with(service: ConversionService) -> Result<AxumContext> {
    let config = service.config();
    config.validate().context("invalid service configuration")?;
    ensure_service_dirs(config).context("failed to prepare storage directories")?;

    info!(
        upload_dir = %config.upload_dir.display(),
        output_dir = %config.output_dir.display(),
        max_file_size = config.max_file_size,
        retention_secs = config.retention_delay.as_secs(),
        "Storage ready"
    );

    let cancel = CancellationToken::new();
    let tasks = TaskTracker::new();
    let retention = RetentionScheduler::new(config.retention_delay, cancel.clone(), tasks.clone());

    let ctx = AxumContext {
        service: Arc::new(service),
        retention,
        cancel,
        tasks,
    };
    if let Some(sweeper) = ctx.sweeper() {
        sweeper.spawn(ctx.cancel.clone(), &ctx.tasks);
    }

    Ok(ctx)
}

/// Bootstrap and serve until Ctrl-C.
pub async fn start_server(
    config: ServiceConfig,
    converter: Arc<dyn DocumentConverter>,
) -> Result<()> {
    let ctx = bootstrap(config, converter)?;

    let shutdown = ctx.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            shutdown.cancel();
        }
    });

    serve(ctx).await
}

/// Bind the configured address and serve until the context is cancelled.
pub async fn serve(ctx: AxumContext) -> Result<()> {
    let config = ctx.service.config();
    let addr = SocketAddr::new(config.host, config.port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    serve_listener(listener, ctx).await
}

/// Serve on a pre-bound listener until the context is cancelled.
///
/// On return every background task has been cancelled and awaited.
pub async fn serve_listener(listener: TcpListener, ctx: AxumContext) -> Result<()> {
    let addr = listener.local_addr()?;
    let cancel = ctx.cancel.clone();
    let tasks = ctx.tasks.clone();

    info!("docconv listening on http://{addr}");
    info!("Upload DOCX files at http://{addr}/");

    let result = axum::serve(listener, create_router(ctx))
        .with_graceful_shutdown(cancel.clone().cancelled_owned())
        .await;

    cancel.cancel();
    tasks.close();
    tasks.wait().await;
    info!("docconv server shut down");

    result.context("server error")
}
