//! Error types for the download module.
//!
//! Every variant is scoped to a single file: the batch scheduler converts
//! these into failed results and the run continues.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while downloading one file.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The server answered with a non-200 status.
    #[error("HTTP {status} downloading {url}")]
    Remote {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The request did not finish within its deadline.
    #[error("timeout after {}s downloading {url}", .after.as_secs_f32())]
    Timeout {
        /// The URL that timed out.
        url: String,
        /// The deadline that elapsed, measured from request start.
        after: Duration,
    },

    /// Connection-level error (DNS resolution, refused, reset, TLS, etc.)
    #[error("network error downloading {url}: {source}")]
    Transport {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// File system error (create, write, flush).
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The result item's URL has no usable filename.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },
}

impl DownloadError {
    /// Creates a remote status error.
    pub fn remote(url: impl Into<String>, status: u16) -> Self {
        Self::Remote {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            url: url.into(),
            after,
        }
    }

    /// Creates a transport error from a reqwest error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Short reason for the one-line failure message shown to the user.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Remote { status, .. } => format!("HTTP {status}"),
            Self::Timeout { after, .. } => format!("timed out after {}s", after.as_secs()),
            Self::Transport { source, .. } => format!("network error ({source})"),
            Self::Io { source, .. } => format!("write error ({source})"),
            Self::InvalidUrl { .. } => "no filename in URL".to_string(),
        }
    }
}

// No From<reqwest::Error> / From<std::io::Error>: every variant needs the url
// or path that the source error does not carry.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_remote_display() {
        let error = DownloadError::remote("https://example.com/a.jpg", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(
            msg.contains("https://example.com/a.jpg"),
            "Expected URL in: {msg}"
        );
        assert_eq!(error.reason(), "HTTP 404");
    }

    #[test]
    fn test_download_error_timeout_display() {
        let error = DownloadError::timeout("https://example.com/a.jpg", Duration::from_secs(30));
        let msg = error.to_string();
        assert!(msg.contains("timeout"), "Expected 'timeout' in: {msg}");
        assert!(msg.contains("30"), "Expected deadline in: {msg}");
        assert_eq!(error.reason(), "timed out after 30s");
    }

    #[test]
    fn test_download_error_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = DownloadError::io(PathBuf::from("/tmp/a.jpg"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/a.jpg"), "Expected path in: {msg}");
        assert!(error.reason().contains("access denied"));
    }

    #[test]
    fn test_download_error_invalid_url_display() {
        let error = DownloadError::invalid_url("https://example.com/");
        assert!(error.to_string().contains("invalid URL"));
        assert_eq!(error.reason(), "no filename in URL");
    }
}
