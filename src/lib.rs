//! Wallget Core Library
//!
//! This library provides the core functionality for the wallget tool, which
//! pages through an image-gallery search API and saves every result into a
//! local directory.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`api`] - Search query model, page fetcher, and result envelope
//! - [`download`] - Batched, streaming image downloads with a shared progress line
//! - [`session`] - Per-run state and the page-by-page run loop
//! - [`error`] - Errors that abort a run

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod download;
pub mod error;
pub mod session;
mod user_agent;

// Re-export commonly used types
pub use api::{
    Categories, DEFAULT_SEARCH_ENDPOINT, Order, PAGE_SIZE, Purity, SearchClient, SearchQuery,
    Sorting, TopRange,
};
pub use download::{
    BatchScheduler, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_SECS, DownloadError, HttpClient,
    ImageDownloader, ProgressReporter, TaskOutcome,
};
pub use error::RunError;
pub use session::{API_KEY_ENV, DownloadSession, RunSummary, SessionConfig, api_key_from_env};
