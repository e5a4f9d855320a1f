//! Download session: page loop over the search API feeding the batch scheduler.
//!
//! A session is created once per process. It owns the target directory, the
//! shared HTTP connection pool, and the progress reporter, and drives pages
//! strictly one after another: page N+1 is fetched only after every batch of
//! page N has settled.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use crate::api::{PAGE_SIZE, SearchClient, SearchQuery};
use crate::download::{
    BatchResult, BatchScheduler, HttpClient, ImageDownloader, ProgressReporter, TaskOutcome,
    offset_index_for_start_page, plan_page,
};
use crate::error::RunError;

/// Environment variable holding the API credential.
pub const API_KEY_ENV: &str = "WALLGET_API_KEY";

/// Reads the API credential from [`API_KEY_ENV`].
///
/// # Errors
///
/// Returns [`RunError::MissingCredential`] if the variable is unset or blank.
pub fn api_key_from_env() -> Result<String, RunError> {
    api_key_from(std::env::var_os(API_KEY_ENV))
}

/// Validates a raw credential value.
///
/// # Errors
///
/// Returns [`RunError::MissingCredential`] for `None`, blank, or non-UTF-8 values.
pub fn api_key_from(value: Option<OsString>) -> Result<String, RunError> {
    value
        .and_then(|raw| raw.into_string().ok())
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or(RunError::MissingCredential { var: API_KEY_ENV })
}

/// Process-wide settings for a session.
#[derive(Clone)]
pub struct SessionConfig {
    /// Directory receiving downloaded files; created if absent.
    pub target_dir: PathBuf,
    /// Maximum number of downloads in flight, bounded by the batch scheduler.
    /// Also caps the idle keep-alive connections kept per host.
    pub concurrency: usize,
    /// Per-download deadline measured from request start.
    pub timeout: Duration,
    /// API credential sent as a header on every request.
    pub api_key: String,
    /// Search endpoint URL.
    pub search_endpoint: String,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("target_dir", &self.target_dir)
            .field("concurrency", &self.concurrency)
            .field("timeout", &self.timeout)
            .field("api_key", &"<redacted>")
            .field("search_endpoint", &self.search_endpoint)
            .finish()
    }
}

/// Totals for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pages_fetched: u32,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Adds one page's batch results.
    pub fn record(&mut self, results: &[BatchResult]) {
        for result in results {
            match result.outcome {
                TaskOutcome::Downloaded { .. } => self.downloaded += 1,
                TaskOutcome::Skipped => self.skipped += 1,
                TaskOutcome::Failed(_) => self.failed += 1,
            }
        }
    }

    /// Number of tasks that settled.
    #[must_use]
    pub fn total(&self) -> usize {
        self.downloaded + self.skipped + self.failed
    }
}

/// State shared by every page of a run.
#[derive(Debug)]
pub struct DownloadSession {
    target_dir: PathBuf,
    search: SearchClient,
    downloader: ImageDownloader,
    scheduler: BatchScheduler,
    reporter: Arc<ProgressReporter>,
}

impl DownloadSession {
    /// Prepares the target directory and the shared client.
    ///
    /// # Errors
    ///
    /// - [`RunError::InvalidConcurrency`] outside 1..=100
    /// - [`RunError::TargetDir`] if the directory cannot be created
    /// - [`RunError::Client`] if the HTTP client cannot be built
    /// - [`RunError::Page`] if the search endpoint is not a valid URL
    #[instrument(skip(reporter), fields(target_dir = %config.target_dir.display()))]
    pub async fn new(
        config: SessionConfig,
        reporter: Arc<ProgressReporter>,
    ) -> Result<Self, RunError> {
        let scheduler = BatchScheduler::new(config.concurrency)?;

        tokio::fs::create_dir_all(&config.target_dir)
            .await
            .map_err(|source| RunError::TargetDir {
                path: config.target_dir.clone(),
                source,
            })?;

        let client = HttpClient::new(&config.api_key, config.concurrency)?;
        let search = SearchClient::new(client.inner().clone(), &config.search_endpoint)?;
        let downloader = ImageDownloader::new(client, Arc::clone(&reporter), config.timeout);

        debug!(
            concurrency = config.concurrency,
            timeout_secs = config.timeout.as_secs(),
            endpoint = %search.endpoint(),
            "session ready"
        );

        Ok(Self {
            target_dir: config.target_dir,
            search,
            downloader,
            scheduler,
            reporter,
        })
    }

    /// Directory receiving downloaded files.
    #[must_use]
    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Downloads `page_count` pages starting at `start_page` (1-based).
    ///
    /// Stops early at the first empty page or the page marked last by the API.
    /// Per-file failures are counted in the summary and never stop the run.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Page`] if any page fetch fails; nothing is retried.
    #[instrument(skip(self, query))]
    pub async fn run(
        &self,
        query: &SearchQuery,
        start_page: u32,
        page_count: u32,
    ) -> Result<RunSummary, RunError> {
        let started = Instant::now();
        let start_page = start_page.max(1);
        let end_page = start_page.saturating_add(page_count);
        let mut summary = RunSummary::default();

        self.downloader.set_total(u64::from(page_count) * PAGE_SIZE);

        info!(start_page, page_count, "starting run");

        for page in start_page..end_page {
            let result_page = self.search.fetch_page(query, page).await?;
            summary.pages_fetched += 1;

            if page == start_page
                && let Some(total) = result_page.total()
            {
                let remaining = total.saturating_sub(offset_index_for_start_page(start_page));
                let planned = u64::from(page_count) * PAGE_SIZE;
                self.downloader.set_total(planned.min(remaining));
            }

            if result_page.is_empty() {
                info!(page, "no more results");
                break;
            }

            let tasks = plan_page(&result_page.items, page, start_page, &self.target_dir);
            debug!(page, tasks = tasks.len(), "planned page");
            let results = self.scheduler.run(tasks, &self.downloader).await;
            summary.record(&results);

            if result_page.is_last() {
                info!(page, "reached last page");
                break;
            }
        }

        summary.elapsed = started.elapsed();
        info!(
            pages = summary.pages_fetched,
            downloaded = summary.downloaded,
            skipped = summary.skipped,
            failed = summary.failed,
            elapsed_ms = summary.elapsed.as_millis(),
            "run complete"
        );
        Ok(summary)
    }

    /// Tears the session down: clears the live progress line and closes
    /// pooled connections.
    pub fn finish(self) {
        self.reporter.finish();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::download::DownloadError;
    use tempfile::TempDir;

    fn config(target_dir: PathBuf, concurrency: usize) -> SessionConfig {
        SessionConfig {
            target_dir,
            concurrency,
            timeout: Duration::from_secs(5),
            api_key: "k3y".into(),
            search_endpoint: crate::api::DEFAULT_SEARCH_ENDPOINT.into(),
        }
    }

    #[test]
    fn test_api_key_missing_or_blank_is_startup_error() {
        assert!(matches!(
            api_key_from(None),
            Err(RunError::MissingCredential { var: API_KEY_ENV })
        ));
        assert!(api_key_from(Some(OsString::from("   "))).is_err());
    }

    #[test]
    fn test_api_key_is_trimmed() {
        assert_eq!(api_key_from(Some(OsString::from(" abc \n"))).unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_new_creates_missing_target_dir() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("nested").join("walls");

        let reporter = Arc::new(ProgressReporter::hidden());
        let session = DownloadSession::new(config(target.clone(), 4), reporter)
            .await
            .unwrap();

        assert!(target.is_dir());
        assert_eq!(session.target_dir(), target);
        session.finish();
    }

    #[tokio::test]
    async fn test_new_reuses_existing_target_dir() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("keep.jpg"), b"x").unwrap();

        let session = DownloadSession::new(
            config(temp_dir.path().to_path_buf(), 4),
            Arc::new(ProgressReporter::hidden()),
        )
        .await
        .unwrap();

        assert!(temp_dir.path().join("keep.jpg").exists());
        session.finish();
    }

    #[tokio::test]
    async fn test_new_rejects_invalid_concurrency() {
        let temp_dir = TempDir::new().unwrap();
        let result = DownloadSession::new(
            config(temp_dir.path().to_path_buf(), 0),
            Arc::new(ProgressReporter::hidden()),
        )
        .await;
        assert!(matches!(result, Err(RunError::InvalidConcurrency { value: 0 })));
    }

    #[test]
    fn test_summary_records_each_outcome() {
        let mut summary = RunSummary::default();
        summary.record(&[
            BatchResult {
                index: 1,
                name: "a.jpg".into(),
                outcome: TaskOutcome::Downloaded { bytes: 10 },
            },
            BatchResult {
                index: 2,
                name: "b.jpg".into(),
                outcome: TaskOutcome::Skipped,
            },
            BatchResult {
                index: 3,
                name: "c.jpg".into(),
                outcome: TaskOutcome::Failed(DownloadError::remote("https://w.example/c.jpg", 404)),
            },
        ]);
        assert_eq!((summary.downloaded, summary.skipped, summary.failed), (1, 1, 1));
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn test_session_config_debug_redacts_key() {
        let rendered = format!("{:?}", config(PathBuf::from("/tmp"), 1));
        assert!(!rendered.contains("k3y"));
    }
}
