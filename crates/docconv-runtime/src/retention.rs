//! Delayed deletion of downloaded artifacts.
//!
//! The first download request for an artifact schedules its removal after the
//! retention delay. Timers are owned by a `TaskTracker` and stop when the
//! server's cancellation token fires, so none outlive the server.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Schedules one deletion per artifact.
#[derive(Debug, Clone)]
pub struct RetentionScheduler {
    delay: Duration,
    pending: Arc<Mutex<HashSet<PathBuf>>>,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl RetentionScheduler {
    /// Create a scheduler whose timers stop when `cancel` fires.
    pub fn new(delay: Duration, cancel: CancellationToken, tracker: TaskTracker) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(HashSet::new())),
            cancel,
            tracker,
        }
    }

    /// Delay between scheduling and deletion.
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `path` for deletion.
    ///
    /// Returns `false` if a deletion is already pending for it; the original
    /// deadline is kept.
    pub fn schedule(&self, path: PathBuf) -> bool {
        if self.cancel.is_cancelled() {
            debug!(target: "docconv.retention", path = %path.display(), "Shutting down, not scheduling");
            return false;
        }
        if !self.lock().insert(path.clone()) {
            return false;
        }

        let deadline = Instant::now() + self.delay;
        let cancel = self.cancel.clone();
        let pending = Arc::clone(&self.pending);

        debug!(
            target: "docconv.retention",
            path = %path.display(),
            delay_secs = self.delay.as_secs(),
            "Scheduled artifact removal"
        );

        self.tracker.spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(target: "docconv.retention", path = %path.display(), "Removal cancelled");
                }
                () = sleep_until(deadline) => remove_artifact(&path),
            }
            pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&path);
        });
        true
    }

    /// Whether a removal is pending for `path`.
    pub fn is_scheduled(&self, path: &Path) -> bool {
        self.lock().contains(path)
    }

    /// Number of pending removals.
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<PathBuf>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn remove_artifact(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => info!(target: "docconv.retention", path = %path.display(), "Removed artifact"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(target: "docconv.retention", path = %path.display(), "Artifact already gone");
        }
        Err(e) => warn!(
            target: "docconv.retention",
            path = %path.display(),
            error = %e,
            "Failed to remove artifact"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DELAY: Duration = Duration::from_secs(300);

    /// Let spawned tasks on the current-thread runtime run to their next await.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn artifact(temp: &TempDir) -> PathBuf {
        let path = temp.path().join("report_20240101_100000.pdf");
        std::fs::write(&path, b"%PDF").unwrap();
        path
    }

    #[tokio::test(start_paused = true)]
    async fn removes_artifact_after_delay() {
        let temp = TempDir::new().unwrap();
        let path = artifact(&temp);
        let scheduler = RetentionScheduler::new(DELAY, CancellationToken::new(), TaskTracker::new());

        assert!(scheduler.schedule(path.clone()));
        assert!(scheduler.is_scheduled(&path));

        tokio::time::advance(DELAY - Duration::from_secs(1)).await;
        settle().await;
        assert!(path.exists());

        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert!(!path.exists());
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn second_schedule_keeps_first_deadline() {
        let temp = TempDir::new().unwrap();
        let path = artifact(&temp);
        let scheduler = RetentionScheduler::new(DELAY, CancellationToken::new(), TaskTracker::new());

        assert!(scheduler.schedule(path.clone()));
        tokio::time::advance(Duration::from_secs(200)).await;
        assert!(!scheduler.schedule(path.clone()));
        assert_eq!(scheduler.pending(), 1);

        tokio::time::advance(Duration::from_secs(101)).await;
        settle().await;
        assert!(!path.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_timers_and_keeps_files() {
        let temp = TempDir::new().unwrap();
        let path = artifact(&temp);
        let cancel = CancellationToken::new();
        let tracker = TaskTracker::new();
        let scheduler = RetentionScheduler::new(DELAY, cancel.clone(), tracker.clone());

        scheduler.schedule(path.clone());
        cancel.cancel();
        tracker.close();
        tracker.wait().await;

        assert!(path.exists());
        assert_eq!(scheduler.pending(), 0);
        assert!(!scheduler.schedule(path.clone()));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_file_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gone.pdf");
        let scheduler = RetentionScheduler::new(DELAY, CancellationToken::new(), TaskTracker::new());

        assert!(scheduler.schedule(path.clone()));
        tokio::time::advance(DELAY + Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(scheduler.pending(), 0);
    }
}
