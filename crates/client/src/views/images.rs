//! Selectable image catalogue shared by the create and edit forms.

use eventdesk_core::event::EventImage;
use eventdesk_core::query::event_images_key;
use eventdesk_core::view::SectionContent;

use super::{images_fetcher, render, SharedApi};
use crate::query::{QueryClient, QueryObserver, QueryOptions};

pub const IMAGES_ERROR_TITLE: &str = "Failed to load selectable images";
pub const IMAGES_ERROR_FALLBACK: &str = "Please try again later.";

pub struct ImagePicker {
    api: SharedApi,
    queries: QueryClient,
    _observer: QueryObserver,
}

impl ImagePicker {
    pub fn new(api: SharedApi, queries: QueryClient) -> Self {
        let observer = queries.observe(event_images_key());
        Self {
            api,
            queries,
            _observer: observer,
        }
    }

    pub async fn content(&self) -> SectionContent<Vec<EventImage>> {
        let _ = self
            .queries
            .fetch_query(&event_images_key(), QueryOptions::new(), images_fetcher(&self.api))
            .await;
        self.snapshot()
    }

    pub fn snapshot(&self) -> SectionContent<Vec<EventImage>> {
        render(
            self.queries.query_state(&event_images_key()),
            IMAGES_ERROR_TITLE,
            IMAGES_ERROR_FALLBACK,
        )
    }
}
