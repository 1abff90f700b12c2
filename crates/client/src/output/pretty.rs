//! Pretty output formatting.

use eventdesk_core::event::{Event, EventImage};
use eventdesk_core::route::Route;
use eventdesk_core::view::ErrorBlock;

use crate::views::EventDetails;

/// Shown for a section whose request did not complete.
pub const LOADING: &str = "Loading...";

/// Format an event for display.
pub fn format_event(event: &Event) -> String {
    format!(
        "{}\n  ID: {}\n  When: {} {}\n  Where: {}",
        event.title,
        event.id,
        event.date,
        event.time.format("%H:%M"),
        event.location
    )
}

/// Format events for display.
pub fn format_events(events: &[Event]) -> String {
    if events.is_empty() {
        return "No events found.".to_string();
    }
    let mut output = format!("EVENTS ({})\n", events.len());
    output.push_str(&"-".repeat(40));
    for event in events {
        output.push_str(&format!("\n{}", format_event(event)));
        output.push('\n');
    }
    output
}

/// Format the detail view of an event.
pub fn format_details(details: &EventDetails) -> String {
    let mut output = format_event(&details.event);
    output.push_str(&format!("\n  Image: {}", details.image_url));
    if !details.event.description.is_empty() {
        output.push_str(&format!("\n\n{}", details.event.description));
    }
    output
}

/// Format selectable images for display.
pub fn format_images(images: &[EventImage]) -> String {
    if images.is_empty() {
        return "No images available.".to_string();
    }
    let mut output = format!("IMAGES ({})\n", images.len());
    output.push_str(&"-".repeat(40));
    for image in images {
        output.push_str(&format!("\n{}\n  {}", image.path, image.caption));
    }
    output
}

/// Format an error block.
pub fn format_error(block: &ErrorBlock) -> String {
    format!("{}\n  {}", block.title, block.message)
}

/// Format a navigation target.
pub fn format_route(route: &Route) -> String {
    format!("Next: {}", route)
}
