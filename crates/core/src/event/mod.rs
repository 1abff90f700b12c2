mod operations;
mod requests;
mod types;

pub use operations::{filter_events, image_url, matches_search};
pub use requests::{
    ErrorBody, EventEnvelope, EventResponse, EventsResponse, ImagesResponse, ListEventsQuery,
    UpdateEventRequest,
};
pub use types::{Event, EventDraft, EventImage};
