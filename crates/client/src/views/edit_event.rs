//! Edit form with optimistic update.

use tokio::task::JoinHandle;

use eventdesk_core::event::{Event, UpdateEventRequest};
use eventdesk_core::query::{event_key, QueryKey};
use eventdesk_core::route::Route;
use eventdesk_core::view::SectionContent;

use super::{event_fetcher, render, ImagePicker, SharedApi};
use crate::api::EventsApi;
use crate::query::{AbortSignal, QueryClient, QueryError, QueryObserver, QueryOptions};

pub const EDIT_LOAD_ERROR_TITLE: &str = "An error occurred";
pub const EDIT_LOAD_ERROR_FALLBACK: &str = "Please try again.";

/// A submitted edit: where to go now, and the background outcome.
#[derive(Debug)]
pub struct EditSubmission {
    pub route: Route,
    /// Resolves after the update settled and the key was reconciled.
    pub outcome: JoinHandle<Result<Event, QueryError>>,
}

pub struct EditEventView {
    api: SharedApi,
    queries: QueryClient,
    id: String,
    _observer: QueryObserver,
}

impl EditEventView {
    pub fn new(api: SharedApi, queries: QueryClient, id: impl Into<String>) -> Self {
        let id = id.into();
        let observer = queries.observe(event_key(&id));
        Self {
            api,
            queries,
            id,
            _observer: observer,
        }
    }

    fn key(&self) -> QueryKey {
        event_key(&self.id)
    }

    /// Loads the event to pre-fill the form. Shares its cache entry with the
    /// detail view.
    pub async fn load(&self) -> SectionContent<Event> {
        let _ = self
            .queries
            .fetch_query(&self.key(), QueryOptions::new(), event_fetcher(&self.api, &self.id))
            .await;
        self.snapshot()
    }

    pub fn snapshot(&self) -> SectionContent<Event> {
        render(
            self.queries.query_state(&self.key()),
            EDIT_LOAD_ERROR_TITLE,
            EDIT_LOAD_ERROR_FALLBACK,
        )
    }

    /// Image choices for the form.
    pub fn images(&self) -> ImagePicker {
        ImagePicker::new(self.api.clone(), self.queries.clone())
    }

    /// Submits an edit.
    ///
    /// `update` is applied to the loaded event and the full result is sent.
    /// The cached event is patched before this returns. The request, the
    /// commit or rollback, and the reconciling refetch run on a spawned task,
    /// so the caller can navigate to the details route straight away.
    ///
    /// Must be called within a tokio runtime.
    pub fn submit(&self, update: UpdateEventRequest) -> Result<EditSubmission, QueryError> {
        let mut edited = None;
        let optimistic = self
            .queries
            .begin_optimistic(&self.key(), |previous: Option<Event>| {
                edited = previous.map(|event| update.applied(&event));
                edited.clone()
            })?;

        let api = self.api.clone();
        let id = self.id.clone();
        let outcome = tokio::spawn(async move {
            let result = match edited {
                Some(event) => api.update_event(id, event.to_draft()).await,
                None => update_current(api.as_ref(), id, update).await,
            };
            optimistic.settle(result).await
        });

        tracing::debug!(id = %self.id, "Edit submitted");
        Ok(EditSubmission {
            route: Route::EditEvent(self.id.clone()).parent(),
            outcome,
        })
    }

    /// Route the form's cancel action leads to.
    pub fn cancel(&self) -> Route {
        Route::EditEvent(self.id.clone()).parent()
    }
}

/// Applies `update` to the backend's copy of the event when nothing was
/// loaded to edit.
async fn update_current(
    api: &dyn EventsApi,
    id: String,
    update: UpdateEventRequest,
) -> crate::error::Result<Event> {
    let current = api.fetch_event(id.clone(), AbortSignal::never()).await?;
    api.update_event(id, update.applied(&current).to_draft()).await
}
