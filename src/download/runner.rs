//! Per-task download pipeline: sink, transport, progress.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::client::{Fetched, HttpClient};
use super::error::DownloadError;
use super::progress::{LineStatus, ProgressReporter, TaskProgress};
use super::scheduler::{TaskOutcome, TaskRunner};
use super::sink::FileSink;
use super::task::{DownloadTask, PlannedTask};

/// Downloads result images to disk, one settled status line per task.
#[derive(Debug)]
pub struct ImageDownloader {
    client: HttpClient,
    reporter: Arc<ProgressReporter>,
    timeout: Duration,
    total: AtomicU64,
}

impl ImageDownloader {
    #[must_use]
    pub fn new(client: HttpClient, reporter: Arc<ProgressReporter>, timeout: Duration) -> Self {
        Self {
            client,
            reporter,
            timeout,
            total: AtomicU64::new(0),
        }
    }

    /// Sets the total shown in `current/total` counters.
    pub fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
    }

    /// Total shown in `current/total` counters.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    async fn download(&self, task: &DownloadTask, progress: &mut TaskProgress) -> TaskOutcome {
        match FileSink::exists(&task.destination).await {
            Ok(true) => return TaskOutcome::Skipped,
            Ok(false) => {}
            Err(error) => return TaskOutcome::Failed(error),
        }

        let fetched = self
            .client
            .fetch(
                &task.url,
                &task.destination,
                progress,
                task.size_hint,
                self.timeout,
            )
            .await;

        match fetched {
            Ok(Fetched::Written(bytes)) => TaskOutcome::Downloaded { bytes },
            Ok(Fetched::AlreadyExists) => TaskOutcome::Skipped,
            Err(error) => TaskOutcome::Failed(error),
        }
    }
}

#[async_trait]
impl TaskRunner for ImageDownloader {
    async fn run(&self, task: &PlannedTask) -> TaskOutcome {
        let total = self.total();
        match task {
            PlannedTask::Invalid { index, url } => {
                let error = DownloadError::invalid_url(url.clone());
                self.reporter
                    .finish_line(url, &LineStatus::Failed(error.reason()), *index, total);
                TaskOutcome::Failed(error)
            }
            PlannedTask::Ready(task) => {
                let mut progress = self.reporter.task(task.filename(), task.index, total);
                let outcome = self.download(task, &mut progress).await;
                let status = match &outcome {
                    TaskOutcome::Downloaded { .. } => LineStatus::Done,
                    TaskOutcome::Skipped => LineStatus::Skipped,
                    TaskOutcome::Failed(error) => LineStatus::Failed(error.reason()),
                };
                progress.finish(&status);
                outcome
            }
        }
    }
}
