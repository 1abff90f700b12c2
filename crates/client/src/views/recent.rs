//! Recently added events.

use std::time::Duration;

use eventdesk_core::event::{Event, ListEventsQuery};
use eventdesk_core::query::{recent_events_key, QueryKey};
use eventdesk_core::view::SectionContent;

use super::{events_fetcher, render, SharedApi};
use crate::query::{QueryClient, QueryObserver, QueryOptions};

/// Number of events shown.
pub const RECENT_EVENTS_MAX: u32 = 3;

/// Remounts within this window reuse the cached list.
pub const RECENT_EVENTS_STALE_TIME: Duration = Duration::from_secs(5);

pub const RECENT_ERROR_TITLE: &str = "An error occurred";
pub const RECENT_ERROR_FALLBACK: &str = "Failed to fetch events";

pub struct RecentEventsView {
    api: SharedApi,
    queries: QueryClient,
    _observer: QueryObserver,
}

impl RecentEventsView {
    pub fn new(api: SharedApi, queries: QueryClient) -> Self {
        let observer = queries.observe(Self::key());
        Self {
            api,
            queries,
            _observer: observer,
        }
    }

    fn key() -> QueryKey {
        recent_events_key(RECENT_EVENTS_MAX)
    }

    pub async fn content(&self) -> SectionContent<Vec<Event>> {
        let query = ListEventsQuery::new().with_max(RECENT_EVENTS_MAX);
        let options = QueryOptions::new().stale_time(RECENT_EVENTS_STALE_TIME);
        let _ = self
            .queries
            .fetch_query(&Self::key(), options, events_fetcher(&self.api, query))
            .await;
        self.snapshot()
    }

    pub fn snapshot(&self) -> SectionContent<Vec<Event>> {
        render(
            self.queries.query_state(&Self::key()),
            RECENT_ERROR_TITLE,
            RECENT_ERROR_FALLBACK,
        )
    }
}
