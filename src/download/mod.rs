//! Concurrent batch downloading of search results.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large images)
//! - Skip-if-exists destinations, so re-runs are idempotent
//! - Destination created only after a 200 response
//! - Per-file wall-clock deadline that cancels only the affected task
//! - Partial files removed on every failure path
//! - Fixed-size batches bounding in-flight downloads
//! - One shared, serialized progress line
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use wallget_core::api::ResultItem;
//! use wallget_core::download::{
//!     BatchScheduler, HttpClient, ImageDownloader, ProgressReporter, plan_page,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new("api-key", 4)?;
//! let reporter = Arc::new(ProgressReporter::for_stdout(false));
//! let downloader = ImageDownloader::new(client, reporter, Duration::from_secs(30));
//! let items = vec![ResultItem {
//!     id: None,
//!     path: "https://w.example/full/ab/wallhaven-abc.jpg".into(),
//!     file_size: None,
//! }];
//! let tasks = plan_page(&items, 1, 1, Path::new("./wallpapers"));
//! let results = BatchScheduler::new(4)?.run(tasks, &downloader).await;
//! println!("{} settled", results.len());
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod error;
pub mod progress;
mod runner;
mod scheduler;
mod sink;
mod task;

pub use client::{API_KEY_HEADER, ClientBuildError, Fetched, HttpClient};
pub use constants::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_SECS, MAX_CONCURRENCY, MIN_CONCURRENCY};
pub use error::DownloadError;
pub use progress::{LineStatus, ProgressReporter, TaskProgress};
pub use runner::ImageDownloader;
pub use scheduler::{BatchResult, BatchScheduler, TaskOutcome, TaskRunner};
pub use sink::{FileSink, SinkOpen, WriteHandle};
pub use task::{
    DownloadTask, PlannedTask, filename_from_url, global_index, offset_index_for_start_page,
    plan_page,
};
