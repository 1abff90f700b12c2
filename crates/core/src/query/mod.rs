//! Pure building blocks of the query cache: keys, filters and freshness rules.

mod keys;
mod state;

pub use keys::{
    event_images_key, event_key, events_key, events_search_key, recent_events_key, KeySegment,
    QueryFilter, QueryKey, EVENTS_TAG, EVENT_IMAGES_TAG,
};
pub use state::{is_fresh, needs_fetch, QueryStatus};
