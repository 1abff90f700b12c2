//! Event API operations.

use super::{abortable, EventsClient};
use crate::error::Result;
use crate::query::AbortSignal;
use eventdesk_core::event::{
    Event, EventDraft, EventEnvelope, EventResponse, EventsResponse, ListEventsQuery,
};

impl EventsClient {
    /// List events, optionally filtered by search term and limited to the
    /// most recent `max`.
    pub async fn list_events(&self, query: &ListEventsQuery, signal: &AbortSignal) -> Result<Vec<Event>> {
        tracing::debug!(search = ?query.search, max = ?query.max, "Listing events");
        abortable(signal, async {
            let response = self
                .client
                .get(self.url("/events"))
                .query(query)
                .send()
                .await?;
            let body: EventsResponse = self.handle_response(response).await?;
            Ok(body.events)
        })
        .await
    }

    /// Get an event by ID.
    pub async fn get_event(&self, id: &str, signal: &AbortSignal) -> Result<Event> {
        tracing::debug!(%id, "Fetching event");
        abortable(signal, async {
            let response = self.client.get(self.event_url(id)).send().await?;
            let body: EventResponse = self.handle_response(response).await?;
            Ok(body.event)
        })
        .await
    }

    /// Create a new event.
    pub async fn create_event(&self, draft: &EventDraft) -> Result<Event> {
        let response = self
            .client
            .post(self.url("/events"))
            .json(&EventEnvelope::new(draft))
            .send()
            .await?;
        let body: EventResponse = self.handle_response(response).await?;
        tracing::debug!(id = %body.event.id, "Event created");
        Ok(body.event)
    }

    /// Update an event. The backend replaces the stored fields, so `event`
    /// must carry all of them.
    pub async fn update_event(&self, id: &str, event: &EventDraft) -> Result<Event> {
        let response = self
            .client
            .put(self.event_url(id))
            .json(&EventEnvelope::new(event))
            .send()
            .await?;
        let body: EventResponse = self.handle_response(response).await?;
        tracing::debug!(%id, "Event updated");
        Ok(body.event)
    }

    /// Delete an event.
    pub async fn delete_event(&self, id: &str) -> Result<()> {
        let response = self.client.delete(self.event_url(id)).send().await?;
        self.handle_delete_response(response).await?;
        tracing::debug!(%id, "Event deleted");
        Ok(())
    }
}
