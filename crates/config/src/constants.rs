//! Centralized constants for the Humio MCP workspace.
//!
//! This module contains default values used across crates to avoid
//! magic number duplication and improve maintainability.

// =============================================================================
// Connection & Timeout Defaults
// =============================================================================

/// Default timeout for short-lived requests (GraphQL, job create/poll/delete) in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default read timeout for the streaming query fallback in seconds.
///
/// Search scans over large time ranges can take minutes.
pub const DEFAULT_STREAM_TIMEOUT_SECS: u64 = 600;

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 15;

/// Default maximum number of HTTP redirects to follow.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

// =============================================================================
// Timeout Configuration Bounds
// =============================================================================

/// Maximum allowed request or stream timeout in seconds (1 hour).
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Maximum allowed number of streaming attempts.
pub const MAX_STREAM_ATTEMPTS: usize = 10;

// =============================================================================
// Search & Polling Defaults
// =============================================================================

/// Default polling interval for query job status checks in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Default total number of streaming attempts (initial attempt included).
pub const DEFAULT_STREAM_ATTEMPTS: usize = 3;

/// Default linear backoff step between streaming attempts in seconds.
///
/// Attempt `n` (1-based) waits `n * step` before attempt `n + 1`.
pub const DEFAULT_STREAM_BACKOFF_SECS: u64 = 2;

/// Default maximum number of events returned by a search.
pub const DEFAULT_MAX_RESULTS: usize = 200;

/// Default relative start time for searches.
pub const DEFAULT_SEARCH_START: &str = "24h";

/// Default end time for searches.
pub const DEFAULT_SEARCH_END: &str = "now";

// =============================================================================
// File Discovery
// =============================================================================

/// Environment variable holding an explicit config file path.
pub const CONFIG_PATH_ENV: &str = "HUMIO_MCP_CONFIG";

/// File name searched in the working directory and the platform config dir.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application name used for the platform config directory.
pub const APP_NAME: &str = "humio-mcp";
