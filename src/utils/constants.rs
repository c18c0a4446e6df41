//! Shared configuration constants for webextract
//!
//! Default values and environment variable names used throughout the
//! codebase, kept in one place to avoid magic numbers.

/// Marker for a field that could not be read from the page.
///
/// Distinct from the empty string: an element that exists but holds no text
/// yields `""`, an element that does not exist yields this sentinel.
pub const NOT_AVAILABLE: &str = "N/A";

/// Default per-operation timeout (launch, navigation readiness): 30 seconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default browser window size
pub const DEFAULT_WINDOW_SIZE: (u32, u32) = (1920, 1080);

/// Interval between readiness probes while waiting for a page to settle
pub const READINESS_POLL_INTERVAL_MS: u64 = 25;

/// Quiet window used by the `networkidle0` / `networkidle2` shorthands
pub const NETWORK_IDLE_QUIET_WINDOW_MS: u64 = 500;

/// Environment variable: headless flag (`true` / `false`)
pub const ENV_HEADLESS: &str = "WEBEXTRACT_HEADLESS";

/// Environment variable: base URL of the search provider
pub const ENV_BASE_URL: &str = "WEBEXTRACT_BASE_URL";

/// Environment variable: per-operation timeout in milliseconds
pub const ENV_TIMEOUT_MS: &str = "WEBEXTRACT_TIMEOUT_MS";

/// Environment variable: explicit path to a Chrome/Chromium binary
pub const ENV_CHROMIUM_PATH: &str = "CHROMIUM_PATH";

/// Longest accepted search query, in characters
pub const MAX_QUERY_LENGTH: usize = 500;
