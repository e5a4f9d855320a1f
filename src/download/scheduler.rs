//! Fixed-size batch scheduling of download tasks.
//!
//! Tasks are split into contiguous batches of `concurrency` items. Every task
//! in a batch runs concurrently, and the next batch starts only once the whole
//! batch has settled. Peak in-flight work is therefore exactly the
//! concurrency limit, and the start order of tasks is reproducible.

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{debug, info, warn};

use super::constants::{MAX_CONCURRENCY, MIN_CONCURRENCY};
use super::error::DownloadError;
use super::task::PlannedTask;
use crate::error::RunError;

/// Final state of a single task.
#[derive(Debug)]
pub enum TaskOutcome {
    /// The file was written and committed.
    Downloaded {
        /// Bytes written to disk.
        bytes: u64,
    },
    /// The destination already existed.
    Skipped,
    /// The task failed; the run continues.
    Failed(DownloadError),
}

impl TaskOutcome {
    /// True for downloads and skips.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Outcome of one task, tagged with its global index.
#[derive(Debug)]
pub struct BatchResult {
    /// Global sequence index of the task.
    pub index: u64,
    /// Destination filename, or the URL when no filename could be derived.
    pub name: String,
    pub outcome: TaskOutcome,
}

impl BatchResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// Executes one planned task to completion.
///
/// Implementations must never panic on task failure; every error is reported
/// through [`TaskOutcome::Failed`].
#[async_trait]
pub trait TaskRunner: Send + Sync {
    /// Runs the task and reports how it settled.
    async fn run(&self, task: &PlannedTask) -> TaskOutcome;
}

/// Runs planned tasks in strictly ordered, fully settled batches.
#[derive(Debug, Clone, Copy)]
pub struct BatchScheduler {
    concurrency: usize,
}

impl BatchScheduler {
    /// Creates a scheduler with the given batch size.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::InvalidConcurrency`] outside 1..=100.
    pub fn new(concurrency: usize) -> Result<Self, RunError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(RunError::InvalidConcurrency { value: concurrency });
        }
        Ok(Self { concurrency })
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Runs every task and returns one result per task, in task order.
    ///
    /// A failing task never cancels its siblings or later batches.
    pub async fn run<R>(&self, tasks: Vec<PlannedTask>, runner: &R) -> Vec<BatchResult>
    where
        R: TaskRunner + ?Sized,
    {
        let mut results = Vec::with_capacity(tasks.len());

        for (batch_number, batch) in tasks.chunks(self.concurrency).enumerate() {
            debug!(
                batch = batch_number,
                size = batch.len(),
                first_index = batch.first().map(PlannedTask::index),
                "starting batch"
            );

            let settled = join_all(batch.iter().map(|task| async move {
                let outcome = runner.run(task).await;
                BatchResult {
                    index: task.index(),
                    name: task_name(task),
                    outcome,
                }
            }))
            .await;

            for result in &settled {
                match &result.outcome {
                    TaskOutcome::Downloaded { bytes } => {
                        info!(index = result.index, file = %result.name, bytes, "downloaded");
                    }
                    TaskOutcome::Skipped => {
                        debug!(index = result.index, file = %result.name, "skipped existing file");
                    }
                    TaskOutcome::Failed(error) => {
                        warn!(index = result.index, file = %result.name, error = %error, "download failed");
                    }
                }
            }
            results.extend(settled);
        }

        results
    }
}

fn task_name(task: &PlannedTask) -> String {
    match task {
        PlannedTask::Ready(task) => task.filename(),
        PlannedTask::Invalid { url, .. } => url.clone(),
    }
}
