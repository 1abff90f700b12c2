use super::requests::ListEventsQuery;
use super::types::Event;

/// Returns true if the event's title, description or location contains the
/// term, ignoring case.
pub fn matches_search(event: &Event, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    [&event.title, &event.description, &event.location]
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
}

/// Applies a list query to events in insertion order.
///
/// The search filter runs first; `max` then keeps the most recently added
/// events (the tail of the list).
pub fn filter_events(events: &[Event], query: &ListEventsQuery) -> Vec<Event> {
    let matching: Vec<Event> = events
        .iter()
        .filter(|event| {
            query
                .search
                .as_deref()
                .is_none_or(|term| matches_search(event, term))
        })
        .cloned()
        .collect();

    match query.max {
        Some(max) => {
            let skip = matching.len().saturating_sub(max as usize);
            matching.into_iter().skip(skip).collect()
        }
        None => matching,
    }
}

/// Builds the URL the backend serves an event image from.
pub fn image_url(base_url: &str, image: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        image.trim_start_matches('/')
    )
}
