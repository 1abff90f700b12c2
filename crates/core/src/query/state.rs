use std::time::{Duration, Instant};

/// Lifecycle status of a cached query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// No data and no error yet.
    Pending,
    /// The last fetch failed.
    Error,
    /// Data is available and the last fetch succeeded.
    Success,
}

impl QueryStatus {
    /// Derives the status from what the cache holds for a key.
    pub fn from_parts(has_data: bool, has_error: bool) -> Self {
        if has_error {
            QueryStatus::Error
        } else if has_data {
            QueryStatus::Success
        } else {
            QueryStatus::Pending
        }
    }
}

/// Returns true if data written at `updated_at` is still within the staleness window.
///
/// A zero window means data is stale as soon as it is written.
pub fn is_fresh(updated_at: Instant, now: Instant, stale_time: Duration) -> bool {
    now.saturating_duration_since(updated_at) < stale_time
}

/// Decides whether an observation of a key must go to the network.
///
/// Data is served from the cache only when it exists, has not been
/// invalidated, and is still fresh.
pub fn needs_fetch(
    updated_at: Option<Instant>,
    invalidated: bool,
    now: Instant,
    stale_time: Duration,
) -> bool {
    match updated_at {
        Some(updated_at) => invalidated || !is_fresh(updated_at, now, stale_time),
        None => true,
    }
}
