use std::{env, time::Duration};

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL (default: "http://localhost:3000")
    pub base_url: String,
    /// Default staleness window in milliseconds (default: 0)
    pub stale_time_ms: u64,
    /// Maximum number of cached queries (default: 1,000)
    pub cache_max_entries: usize,
    /// HTTP request timeout in seconds (default: 30)
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `EVENTDESK_URL` - Backend base URL (default: "http://localhost:3000")
    /// - `EVENTDESK_STALE_TIME_MS` - Default staleness window (default: 0)
    /// - `EVENTDESK_CACHE_MAX_ENTRIES` - Maximum cached queries (default: 1,000)
    /// - `EVENTDESK_REQUEST_TIMEOUT_SECS` - HTTP timeout (default: 30)
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("EVENTDESK_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            stale_time_ms: env::var("EVENTDESK_STALE_TIME_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            cache_max_entries: env::var("EVENTDESK_CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1_000),
            request_timeout_secs: env::var("EVENTDESK_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }

    /// Override the base URL (e.g. from a command line flag).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Get the default staleness window as a Duration.
    pub fn stale_time(&self) -> Duration {
        Duration::from_millis(self.stale_time_ms)
    }

    /// Get the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
