//! The event backend seam.
//!
//! Views and the query cache talk to the backend through [`EventsApi`] so
//! they can run against the HTTP client or an in-memory double.

use async_trait::async_trait;

use eventdesk_core::event::{Event, EventDraft, EventImage, ListEventsQuery};

use crate::client::EventsClient;
use crate::error::Result;
use crate::query::AbortSignal;

/// Operations the event backend supports.
///
/// Reads take an [`AbortSignal`]; when it fires before the response
/// arrives, the call fails with [`crate::ClientError::Aborted`].
#[async_trait]
pub trait EventsApi: Send + Sync {
    /// Base URL the backend serves uploaded images from.
    fn base_url(&self) -> &str;

    async fn fetch_events(&self, query: ListEventsQuery, signal: AbortSignal) -> Result<Vec<Event>>;

    async fn fetch_event(&self, id: String, signal: AbortSignal) -> Result<Event>;

    async fn create_event(&self, draft: EventDraft) -> Result<Event>;

    /// Replaces every field of an event.
    async fn update_event(&self, id: String, event: EventDraft) -> Result<Event>;

    async fn delete_event(&self, id: String) -> Result<()>;

    async fn fetch_selectable_images(&self, signal: AbortSignal) -> Result<Vec<EventImage>>;
}

#[async_trait]
impl EventsApi for EventsClient {
    fn base_url(&self) -> &str {
        EventsClient::base_url(self)
    }

    async fn fetch_events(&self, query: ListEventsQuery, signal: AbortSignal) -> Result<Vec<Event>> {
        self.list_events(&query, &signal).await
    }

    async fn fetch_event(&self, id: String, signal: AbortSignal) -> Result<Event> {
        self.get_event(&id, &signal).await
    }

    async fn create_event(&self, draft: EventDraft) -> Result<Event> {
        EventsClient::create_event(self, &draft).await
    }

    async fn update_event(&self, id: String, event: EventDraft) -> Result<Event> {
        EventsClient::update_event(self, &id, &event).await
    }

    async fn delete_event(&self, id: String) -> Result<()> {
        EventsClient::delete_event(self, &id).await
    }

    async fn fetch_selectable_images(&self, signal: AbortSignal) -> Result<Vec<EventImage>> {
        self.list_images(&signal).await
    }
}
