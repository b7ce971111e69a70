//! Periodic cleanup of files nobody came back for.
//!
//! Uploads left behind by failed conversions and artifacts that were never
//! downloaded have no other removal path. The sweeper deletes regular files
//! older than the configured TTL from the storage directories. Dot-files and
//! subdirectories (in-flight conversion scratch space) are skipped, as is any
//! path the protection predicate claims.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use docconv_core::ServiceConfig;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Files removed.
    pub removed: usize,
    /// Entries that could not be inspected or removed.
    pub failed: usize,
}

/// Returns `true` for paths the sweeper must leave alone.
pub type ProtectFn = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

/// Removes expired files from a fixed set of directories.
#[derive(Clone)]
pub struct ArtifactSweeper {
    dirs: Vec<PathBuf>,
    ttl: Duration,
    interval: Duration,
    protected: Option<ProtectFn>,
}

impl fmt::Debug for ArtifactSweeper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactSweeper")
            .field("dirs", &self.dirs)
            .field("ttl", &self.ttl)
            .field("interval", &self.interval)
            .field("protected", &self.protected.is_some())
            .finish()
    }
}

impl ArtifactSweeper {
    /// Create a sweeper over `dirs`.
    pub const fn new(dirs: Vec<PathBuf>, ttl: Duration, interval: Duration) -> Self {
        Self {
            dirs,
            ttl,
            interval,
            protected: None,
        }
    }

    /// Skip every path for which `protected` returns `true`, whatever its age.
    #[must_use]
    pub fn with_protected(
        mut self,
        protected: impl Fn(&Path) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.protected = Some(Arc::new(protected));
        self
    }

    /// Build a sweeper for the upload and output directories, if enabled.
    pub fn from_config(config: &ServiceConfig) -> Option<Self> {
        config.artifact_ttl.map(|ttl| {
            Self::new(
                vec![config.upload_dir.clone(), config.output_dir.clone()],
                ttl,
                config.sweep_interval,
            )
        })
    }

    /// Run one pass over every directory, using `now` as the reference time.
    pub fn sweep_at(&self, now: SystemTime) -> SweepReport {
        let mut report = SweepReport::default();
        for dir in &self.dirs {
            match self.sweep_dir(dir, now) {
                Ok(r) => {
                    report.removed += r.removed;
                    report.failed += r.failed;
                }
                Err(e) => warn!(
                    target: "docconv.sweeper",
                    dir = %dir.display(),
                    error = %e,
                    "Failed to scan directory"
                ),
            }
        }
        report
    }

    /// Start sweeping on the tracker until `cancel` fires.
    ///
    /// The first pass runs immediately, which also clears leftovers from a
    /// previous run of the process.
    pub fn spawn(self, cancel: CancellationToken, tracker: &TaskTracker) {
        info!(
            target: "docconv.sweeper",
            ttl_secs = self.ttl.as_secs(),
            interval_secs = self.interval.as_secs(),
            "Starting artifact sweeper"
        );

        tracker.spawn(async move {
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let sweeper = self.clone();
                        match tokio::task::spawn_blocking(move || sweeper.sweep_at(SystemTime::now())).await {
                            Ok(report) if report.removed > 0 || report.failed > 0 => info!(
                                target: "docconv.sweeper",
                                removed = report.removed,
                                failed = report.failed,
                                "Sweep complete"
                            ),
                            Ok(_) => debug!(target: "docconv.sweeper", "Sweep found nothing to remove"),
                            Err(e) => warn!(target: "docconv.sweeper", error = %e, "Sweep task failed"),
                        }
                    }
                }
            }
            debug!(target: "docconv.sweeper", "Artifact sweeper stopped");
        });
    }

    fn is_protected(&self, path: &Path) -> bool {
        self.protected.as_ref().is_some_and(|p| p(path))
    }

    /// Only an unreadable directory fails the pass; entry errors are counted.
    fn sweep_dir(&self, dir: &Path, now: SystemTime) -> io::Result<SweepReport> {
        let mut report = SweepReport::default();

        for entry in std::fs::read_dir(dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    record_entry_error(&mut report, dir, &e, "Failed to read directory entry");
                    continue;
                }
            };
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let path = entry.path();
            if self.is_protected(&path) {
                debug!(target: "docconv.sweeper", path = %path.display(), "Skipping protected file");
                continue;
            }
            let meta = match entry.metadata() {
                Ok(meta) => meta,
                Err(e) => {
                    record_entry_error(&mut report, &path, &e, "Failed to stat file");
                    continue;
                }
            };
            if !meta.is_file() {
                continue;
            }

            // Future mtimes count as fresh
            let age = meta
                .modified()
                .ok()
                .and_then(|m| now.duration_since(m).ok())
                .unwrap_or_default();
            if age <= self.ttl {
                continue;
            }

            match std::fs::remove_file(&path) {
                Ok(()) => {
                    debug!(
                        target: "docconv.sweeper",
                        path = %path.display(),
                        age_secs = age.as_secs(),
                        "Removed expired file"
                    );
                    report.removed += 1;
                }
                Err(e) => {
                    record_entry_error(&mut report, &path, &e, "Failed to remove expired file");
                }
            }
        }

        Ok(report)
    }
}

/// A file that vanished mid-pass was removed by someone else; anything else
/// counts as a failure.
fn record_entry_error(report: &mut SweepReport, path: &Path, err: &io::Error, msg: &str) {
    if err.kind() == io::ErrorKind::NotFound {
        return;
    }
    warn!(target: "docconv.sweeper", path = %path.display(), error = %err, "{msg}");
    report.failed += 1;
}
