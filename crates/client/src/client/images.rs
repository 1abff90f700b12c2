//! Selectable image catalogue.

use super::{abortable, EventsClient};
use crate::error::Result;
use crate::query::AbortSignal;
use eventdesk_core::event::{EventImage, ImagesResponse};

impl EventsClient {
    /// List the images an event can use.
    pub async fn list_images(&self, signal: &AbortSignal) -> Result<Vec<EventImage>> {
        abortable(signal, async {
            let response = self.client.get(self.url("/events/images")).send().await?;
            let body: ImagesResponse = self.handle_response(response).await?;
            Ok(body.images)
        })
        .await
    }
}
