//! Run-level errors: everything that stops a run instead of failing one file.

use std::path::PathBuf;

use thiserror::Error;

use crate::api::ApiError;
use crate::download::ClientBuildError;

/// Fatal errors for a download run.
#[derive(Debug, Error)]
pub enum RunError {
    /// The API credential was not supplied.
    #[error("missing API key: set the {var} environment variable")]
    MissingCredential {
        /// Environment variable that should hold the key.
        var: &'static str,
    },

    /// Concurrency outside the supported range.
    #[error("invalid concurrency value {value}: must be between 1 and 100")]
    InvalidConcurrency {
        /// The rejected value.
        value: usize,
    },

    /// The target directory could not be created.
    #[error("cannot create target directory {path}: {source}")]
    TargetDir {
        /// Directory that was requested.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The shared HTTP client could not be built.
    #[error(transparent)]
    Client(#[from] ClientBuildError),

    /// A page fetch failed; pages are never retried.
    #[error(transparent)]
    Page(#[from] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_names_variable() {
        let msg = RunError::MissingCredential {
            var: "WALLGET_API_KEY",
        }
        .to_string();
        assert!(msg.contains("WALLGET_API_KEY"), "Expected variable in: {msg}");
    }

    #[test]
    fn test_page_error_is_transparent() {
        let msg = RunError::from(ApiError::remote(2, 503)).to_string();
        assert_eq!(msg, ApiError::remote(2, 503).to_string());
    }
}
