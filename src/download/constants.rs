//! Constants for the download module (timeouts, concurrency bounds).

/// HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default per-download deadline in seconds, measured from request start.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of downloads in flight; one full page per batch.
pub const DEFAULT_CONCURRENCY: usize = 24;

/// Minimum allowed concurrency value.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
pub const MAX_CONCURRENCY: usize = 100;
