//! Headless views.
//!
//! Each view owns its query subscriptions ([`QueryObserver`]s, dropped with
//! the view), computes a [`SectionContent`] and returns [`Route`]s instead of
//! navigating.
//!
//! [`QueryObserver`]: crate::query::QueryObserver
//! [`Route`]: eventdesk_core::route::Route

pub mod details;
pub mod edit_event;
pub mod find;
pub mod images;
pub mod new_event;
pub mod recent;

use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};

use eventdesk_core::event::{Event, EventImage, ListEventsQuery};
use eventdesk_core::query::QueryStatus;
use eventdesk_core::view::{ErrorBlock, SectionContent};

use crate::api::EventsApi;
use crate::error::Result;
use crate::query::{AbortSignal, QueryState};

pub use details::{EventDetails, EventDetailsView};
pub use edit_event::{EditEventView, EditSubmission};
pub use find::FindEventsView;
pub use images::ImagePicker;
pub use new_event::NewEventView;
pub use recent::RecentEventsView;

/// Backend handle shared by views.
pub type SharedApi = Arc<dyn EventsApi>;

/// Renders a query state: loading until data arrives, an error block when
/// the last fetch failed (with whatever was cached before it), otherwise the
/// data.
pub(crate) fn render<T>(state: QueryState<T>, error_title: &str, fallback: &str) -> SectionContent<T> {
    match (state.status, state.data) {
        (QueryStatus::Error, stale) => SectionContent::Error {
            error: ErrorBlock::new(
                error_title,
                state.error.as_ref().and_then(|err| err.info_message()),
                fallback,
            ),
            stale,
        },
        (_, Some(data)) => SectionContent::Loaded(data),
        (_, None) => SectionContent::Loading,
    }
}

pub(crate) fn events_fetcher(
    api: &SharedApi,
    query: ListEventsQuery,
) -> impl Fn(AbortSignal) -> BoxFuture<'static, Result<Vec<Event>>> + Send + Sync + 'static {
    let api = api.clone();
    move |signal| {
        let api = api.clone();
        let query = query.clone();
        async move { api.fetch_events(query, signal).await }.boxed()
    }
}

pub(crate) fn event_fetcher(
    api: &SharedApi,
    id: &str,
) -> impl Fn(AbortSignal) -> BoxFuture<'static, Result<Event>> + Send + Sync + 'static {
    let api = api.clone();
    let id = id.to_string();
    move |signal| {
        let api = api.clone();
        let id = id.clone();
        async move { api.fetch_event(id, signal).await }.boxed()
    }
}

pub(crate) fn images_fetcher(
    api: &SharedApi,
) -> impl Fn(AbortSignal) -> BoxFuture<'static, Result<Vec<EventImage>>> + Send + Sync + 'static {
    let api = api.clone();
    move |signal| {
        let api = api.clone();
        async move { api.fetch_selectable_images(signal).await }.boxed()
    }
}
