//! Event search.

use eventdesk_core::event::{Event, ListEventsQuery};
use eventdesk_core::query::{events_search_key, QueryKey};
use eventdesk_core::view::SectionContent;

use super::{events_fetcher, render, SharedApi};
use crate::query::{QueryClient, QueryObserver, QueryOptions};

pub const SEARCH_PROMPT: &str = "Please enter a search term and to find events.";
pub const SEARCH_ERROR_TITLE: &str = "An error occurred";
pub const SEARCH_ERROR_FALLBACK: &str = "Failed to fetch events.";

/// Searches events by term. Nothing is requested until a non-empty term is
/// submitted.
pub struct FindEventsView {
    api: SharedApi,
    queries: QueryClient,
    term: String,
    observer: Option<QueryObserver>,
}

impl FindEventsView {
    pub fn new(api: SharedApi, queries: QueryClient) -> Self {
        Self {
            api,
            queries,
            term: String::new(),
            observer: None,
        }
    }

    /// The active search term.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Sets the active search term, moving the subscription to its key.
    /// The term is searched as entered; only an empty term disables the query.
    pub fn submit(&mut self, term: impl Into<String>) {
        self.term = term.into();
        self.observer = self.enabled().then(|| self.queries.observe(self.key()));
        tracing::debug!(term = %self.term, "Search submitted");
    }

    fn enabled(&self) -> bool {
        !self.term.is_empty()
    }

    fn key(&self) -> QueryKey {
        events_search_key(&self.term)
    }

    /// Resolves the search and returns what the section shows.
    pub async fn content(&self) -> SectionContent<Vec<Event>> {
        if !self.enabled() {
            return self.snapshot();
        }
        let query = ListEventsQuery::new().with_search(self.term.clone());
        let options = QueryOptions::new().enabled(self.enabled());
        // Failures are stored on the key and rendered from there.
        let _ = self
            .queries
            .fetch_query(&self.key(), options, events_fetcher(&self.api, query))
            .await;
        self.snapshot()
    }

    /// What the section shows right now, without fetching.
    pub fn snapshot(&self) -> SectionContent<Vec<Event>> {
        if !self.enabled() {
            return SectionContent::Prompt(SEARCH_PROMPT.to_string());
        }
        render(
            self.queries.query_state(&self.key()),
            SEARCH_ERROR_TITLE,
            SEARCH_ERROR_FALLBACK,
        )
    }
}
