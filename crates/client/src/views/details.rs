//! Event details with delete confirmation.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use eventdesk_core::event::{image_url, Event};
use eventdesk_core::query::{event_key, events_key, QueryFilter, QueryKey};
use eventdesk_core::route::Route;
use eventdesk_core::view::{ErrorBlock, SectionContent};

use super::{event_fetcher, render, SharedApi};
use crate::query::{QueryClient, QueryObserver, QueryOptions, RefetchType};

pub const DETAILS_ERROR_TITLE: &str = "Could not load the event details.";
pub const DETAILS_ERROR_FALLBACK: &str = "Please refresh and try again.";
pub const DELETE_ERROR_TITLE: &str = "Failed to delete the event";
pub const DELETE_ERROR_FALLBACK: &str = "Something went wrong. Please try again later.";

/// A loaded event with its resolved image URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDetails {
    #[serde(flatten)]
    pub event: Event,
    pub image_url: String,
}

#[derive(Debug, Default)]
struct DeleteState {
    confirming: bool,
    pending: bool,
    error: Option<ErrorBlock>,
}

pub struct EventDetailsView {
    api: SharedApi,
    queries: QueryClient,
    id: String,
    observer: Mutex<Option<QueryObserver>>,
    delete: Mutex<DeleteState>,
}

impl EventDetailsView {
    pub fn new(api: SharedApi, queries: QueryClient, id: impl Into<String>) -> Self {
        let id = id.into();
        let observer = queries.observe(event_key(&id));
        Self {
            api,
            queries,
            id,
            observer: Mutex::new(Some(observer)),
            delete: Mutex::new(DeleteState::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn key(&self) -> QueryKey {
        event_key(&self.id)
    }

    fn delete_state(&self) -> MutexGuard<'_, DeleteState> {
        self.delete.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn content(&self) -> SectionContent<EventDetails> {
        let _ = self
            .queries
            .fetch_query(&self.key(), QueryOptions::new(), event_fetcher(&self.api, &self.id))
            .await;
        self.snapshot()
    }

    pub fn snapshot(&self) -> SectionContent<EventDetails> {
        let base_url = self.api.base_url();
        render(
            self.queries.query_state::<Event>(&self.key()),
            DETAILS_ERROR_TITLE,
            DETAILS_ERROR_FALLBACK,
        )
        .map(|event| EventDetails {
            image_url: image_url(base_url, &event.image),
            event,
        })
    }

    /// Opens the delete confirmation.
    pub fn start_delete(&self) {
        self.delete_state().confirming = true;
    }

    /// Closes the delete confirmation.
    pub fn stop_delete(&self) {
        self.delete_state().confirming = false;
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.delete_state().confirming
    }

    pub fn is_delete_pending(&self) -> bool {
        self.delete_state().pending
    }

    /// The error of the last failed delete, shown inside the confirmation.
    pub fn delete_error(&self) -> Option<ErrorBlock> {
        self.delete_state().error.clone()
    }

    /// Deletes the event.
    ///
    /// On success every event list is marked stale without refetching, the
    /// event's own entry is dropped, and the view asks to go to
    /// [`Route::Events`]. On failure the confirmation stays open with an
    /// error block.
    pub async fn confirm_delete(&self) -> Result<Route, ErrorBlock> {
        {
            let mut state = self.delete_state();
            state.pending = true;
            state.error = None;
        }

        let result = self.api.delete_event(self.id.clone()).await;

        match result {
            Ok(()) => {
                self.settle_delete(None);
                tracing::info!(id = %self.id, "Event deleted");

                self.queries
                    .invalidate_queries(&QueryFilter::prefix(events_key()), RefetchType::None)
                    .await;
                self.observer
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take();
                self.queries.remove_queries(&QueryFilter::exact(self.key()));
                Ok(Route::Events)
            }
            Err(err) => {
                tracing::warn!(id = %self.id, error = %err, "Failed to delete event");
                let block = ErrorBlock::new(DELETE_ERROR_TITLE, err.info_message(), DELETE_ERROR_FALLBACK);
                self.settle_delete(Some(block.clone()));
                Err(block)
            }
        }
    }

    fn settle_delete(&self, error: Option<ErrorBlock>) {
        let mut state = self.delete_state();
        state.pending = false;
        if error.is_none() {
            state.confirming = false;
        }
        state.error = error;
    }

    /// Route of the edit form.
    pub fn edit(&self) -> Route {
        Route::EditEvent(self.id.clone())
    }
}
