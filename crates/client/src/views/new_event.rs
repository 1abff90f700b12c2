//! Create form.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use eventdesk_core::event::{Event, EventDraft};
use eventdesk_core::query::{events_key, QueryFilter};
use eventdesk_core::route::Route;
use eventdesk_core::view::ErrorBlock;

use super::{ImagePicker, SharedApi};
use crate::query::{QueryClient, RefetchType};

pub const CREATE_ERROR_TITLE: &str = "Failed to create the event";
pub const CREATE_ERROR_FALLBACK: &str = "Please check the form and try again.";

pub struct NewEventView {
    api: SharedApi,
    queries: QueryClient,
    pending: AtomicBool,
    error: Mutex<Option<ErrorBlock>>,
}

impl NewEventView {
    pub fn new(api: SharedApi, queries: QueryClient) -> Self {
        Self {
            api,
            queries,
            pending: AtomicBool::new(false),
            error: Mutex::new(None),
        }
    }

    /// True while a submission is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// The error of the last failed submission.
    pub fn error(&self) -> Option<ErrorBlock> {
        self.error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_error(&self, error: Option<ErrorBlock>) {
        *self.error.lock().unwrap_or_else(PoisonError::into_inner) = error;
    }

    /// Image choices for the form.
    pub fn images(&self) -> ImagePicker {
        ImagePicker::new(self.api.clone(), self.queries.clone())
    }

    /// Creates the event. On success every event query is invalidated and
    /// active ones refetched before returning [`Route::Events`].
    ///
    /// The draft is checked by the backend only; its message ends up in the
    /// error block.
    pub async fn submit(&self, draft: EventDraft) -> Result<(Event, Route), ErrorBlock> {
        self.set_error(None);
        self.pending.store(true, Ordering::SeqCst);
        let result = self.api.create_event(draft).await;
        self.pending.store(false, Ordering::SeqCst);

        match result {
            Ok(event) => {
                tracing::info!(id = %event.id, "Event created");
                self.queries
                    .invalidate_queries(&QueryFilter::prefix(events_key()), RefetchType::Active)
                    .await;
                Ok((event, Route::Events))
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to create event");
                let block = ErrorBlock::new(CREATE_ERROR_TITLE, err.info_message(), CREATE_ERROR_FALLBACK);
                self.set_error(Some(block.clone()));
                Err(block)
            }
        }
    }

    /// Route the form's cancel action leads to.
    pub fn cancel(&self) -> Route {
        Route::NewEvent.parent()
    }
}
