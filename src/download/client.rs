//! HTTP client wrapper shared by page fetches and image downloads.
//!
//! One `HttpClient` is built per session so every request reuses the same
//! keep-alive connection pool.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue};
use reqwest::{Client, Response, StatusCode};
use thiserror::Error;
use tracing::{debug, instrument};

use super::constants::CONNECT_TIMEOUT_SECS;
use super::error::DownloadError;
use super::progress::TaskProgress;
use super::sink::{FileSink, SinkOpen, WriteHandle};
use crate::user_agent;

/// Header carrying the API credential on every request.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Errors building the shared client.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// The credential cannot be sent as a header value.
    #[error("API key is not a valid header value")]
    InvalidApiKey(#[from] InvalidHeaderValue),

    /// reqwest rejected the configuration.
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// HTTP client for streaming downloads with a per-request deadline.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client that sends `api_key` on every request.
    ///
    /// `pool_size` caps the idle keep-alive connections kept per host; it does
    /// not limit simultaneous requests, which the batch scheduler bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ClientBuildError`] if the key is not a valid header value or
    /// the TLS backend cannot be initialised.
    #[instrument(level = "debug", skip(api_key))]
    pub fn new(api_key: &str, pool_size: usize) -> Result<Self, ClientBuildError> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key)?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .pool_max_idle_per_host(pool_size)
            .default_headers(headers)
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()?;
        Ok(Self { client })
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Downloads `url` to `destination`, reporting progress as chunks arrive.
    ///
    /// The destination is created only after a 200 status arrives, so any
    /// other status leaves the filesystem untouched. The whole request, from
    /// issue to last body byte, must finish within `timeout`; when it does not,
    /// the abandoned write handle removes the partial file.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::Remote`] for any status other than 200
    /// - [`DownloadError::Timeout`] when the deadline elapses
    /// - [`DownloadError::Transport`] for connection-level failures
    /// - [`DownloadError::Io`] when creating or writing the file fails
    #[instrument(skip(self, progress), fields(url = %url, path = %destination.display()))]
    pub async fn fetch(
        &self,
        url: &str,
        destination: &Path,
        progress: &mut TaskProgress,
        size_hint: Option<u64>,
        timeout: Duration,
    ) -> Result<Fetched, DownloadError> {
        match tokio::time::timeout(
            timeout,
            self.fetch_to_file(url, destination, progress, size_hint),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                debug!(timeout_secs = timeout.as_secs(), "download deadline elapsed");
                Err(DownloadError::timeout(url, timeout))
            }
        }
    }

    async fn fetch_to_file(
        &self,
        url: &str,
        destination: &Path,
        progress: &mut TaskProgress,
        size_hint: Option<u64>,
    ) -> Result<Fetched, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DownloadError::remote(url, status.as_u16()));
        }

        let handle = match FileSink::create(destination).await? {
            SinkOpen::AlreadyExists => return Ok(Fetched::AlreadyExists),
            SinkOpen::Ready(handle) => handle,
        };

        progress.set_content_length(response.content_length().or(size_hint));
        write_body(url, response, handle, progress)
            .await
            .map(Fetched::Written)
    }
}

/// Result of a successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetched {
    /// The body was written and committed; carries the byte count.
    Written(u64),
    /// Another writer created the destination between the check and the create.
    AlreadyExists,
}

/// Streams the body into `handle`, then commits it. Any failure discards the
/// file before the error is returned.
async fn write_body(
    url: &str,
    response: Response,
    mut handle: WriteHandle,
    progress: &mut TaskProgress,
) -> Result<u64, DownloadError> {
    let mut stream = response.bytes_stream();
    while let Some(chunk_result) = stream.next().await {
        let written = match chunk_result {
            Ok(chunk) => handle
                .write(&chunk)
                .await
                .map(|()| chunk.len() as u64),
            Err(e) => Err(classify_reqwest_error(url, e)),
        };
        match written {
            Ok(len) => progress.advance(len),
            Err(error) => {
                handle.discard().await;
                return Err(error);
            }
        }
    }

    debug!(bytes = handle.bytes_written(), "body received");
    handle.commit().await
}

fn classify_reqwest_error(url: &str, error: reqwest::Error) -> DownloadError {
    if error.is_timeout() {
        // Only the connect timeout can fire inside reqwest; the request
        // deadline is enforced by the caller.
        DownloadError::timeout(url, Duration::from_secs(CONNECT_TIMEOUT_SECS))
    } else {
        DownloadError::transport(url, error)
    }
}
