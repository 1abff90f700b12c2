//! Event form arguments.

use chrono::{NaiveDate, NaiveTime};
use clap::Args;

use eventdesk_core::event::{EventDraft, UpdateEventRequest};
use eventdesk_core::serde::parse_time;

/// Fields of a new event. Every field is required.
#[derive(Debug, Args)]
pub struct NewEventArgs {
    /// Event title.
    #[arg(long)]
    pub title: String,
    /// Event description.
    #[arg(long)]
    pub description: String,
    /// Event date (YYYY-MM-DD).
    #[arg(long)]
    pub date: NaiveDate,
    /// Event time (HH:MM).
    #[arg(long, value_parser = parse_time)]
    pub time: NaiveTime,
    /// Event location.
    #[arg(long)]
    pub location: String,
    /// Image path, as listed by `eventdesk images`.
    #[arg(long)]
    pub image: String,
}

impl From<NewEventArgs> for EventDraft {
    fn from(args: NewEventArgs) -> Self {
        EventDraft::new(args.title, args.date, args.time)
            .with_description(args.description)
            .with_location(args.location)
            .with_image(args.image)
    }
}

/// Fields to change on an existing event.
#[derive(Debug, Args)]
pub struct EditEventArgs {
    /// Event ID.
    pub id: String,
    /// New title.
    #[arg(long)]
    pub title: Option<String>,
    /// New description.
    #[arg(long)]
    pub description: Option<String>,
    /// New date (YYYY-MM-DD).
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// New time (HH:MM).
    #[arg(long, value_parser = parse_time)]
    pub time: Option<NaiveTime>,
    /// New location.
    #[arg(long)]
    pub location: Option<String>,
    /// New image path.
    #[arg(long)]
    pub image: Option<String>,
}

impl EditEventArgs {
    /// Splits the arguments into the event ID and the update payload.
    pub fn into_update(self) -> (String, UpdateEventRequest) {
        let update = UpdateEventRequest {
            title: self.title,
            description: self.description,
            date: self.date,
            time: self.time,
            location: self.location,
            image: self.image,
        };
        (self.id, update)
    }
}
