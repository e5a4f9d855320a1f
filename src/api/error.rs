//! Error types for the search API layer.

use thiserror::Error;

/// Errors raised while assembling a [`SearchQuery`](super::SearchQuery) from user input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    /// A bitmask was not exactly three `0`/`1` characters.
    #[error("invalid {kind} mask '{value}': expected three characters of 0 or 1, e.g. 110")]
    InvalidMask {
        /// Which mask failed to parse.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// An enumerated parameter had an unknown token.
    #[error("invalid {kind} value '{value}'")]
    InvalidToken {
        /// Which parameter failed to parse.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },
}

impl QueryError {
    pub(crate) fn invalid_mask(kind: &'static str, value: &str) -> Self {
        Self::InvalidMask {
            kind,
            value: value.to_string(),
        }
    }

    pub(crate) fn invalid_token(kind: &'static str, value: &str) -> Self {
        Self::InvalidToken {
            kind,
            value: value.to_string(),
        }
    }
}

/// Errors that can occur while fetching one page of search results.
///
/// Every variant is fatal to the run: page fetches are never retried.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The search endpoint could not be turned into a request URL.
    #[error("invalid search endpoint: {endpoint}")]
    InvalidEndpoint {
        /// The configured endpoint.
        endpoint: String,
    },

    /// The API answered with a non-200 status.
    #[error("search API returned HTTP {status} for page {page}")]
    Remote {
        /// Page number that was requested.
        page: u32,
        /// The HTTP status code.
        status: u16,
    },

    /// Connection-level failure (DNS, refused, reset, body read).
    #[error("network error fetching page {page}: {source}")]
    Transport {
        /// Page number that was requested.
        page: u32,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not a valid search envelope.
    #[error("malformed search response for page {page}: {source}")]
    Parse {
        /// Page number that was requested.
        page: u32,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn invalid_endpoint(endpoint: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
        }
    }

    pub fn remote(page: u32, status: u16) -> Self {
        Self::Remote { page, status }
    }

    /// Wraps a transport error. The request URL carries the API key as a
    /// query parameter, so it is stripped from the source.
    pub fn transport(page: u32, source: reqwest::Error) -> Self {
        Self::Transport {
            page,
            source: source.without_url(),
        }
    }

    pub fn parse(page: u32, source: serde_json::Error) -> Self {
        Self::Parse { page, source }
    }
}
