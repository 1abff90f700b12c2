use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::serde::{deserialize_time, serialize_time};

/// An event as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Opaque identifier assigned by the backend. Never changes once created.
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    #[serde(serialize_with = "serialize_time", deserialize_with = "deserialize_time")]
    pub time: NaiveTime,
    pub location: String,
    /// File name of the uploaded image, relative to the backend base URL.
    pub image: String,
}

impl Event {
    /// Creates an event from a draft and the identifier the backend assigned.
    pub fn from_draft(id: impl Into<String>, draft: EventDraft) -> Self {
        Self {
            id: id.into(),
            title: draft.title,
            description: draft.description,
            date: draft.date,
            time: draft.time,
            location: draft.location,
            image: draft.image,
        }
    }

    /// Returns the event's fields without its identifier.
    pub fn to_draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            date: self.date,
            time: self.time,
            location: self.location.clone(),
            image: self.image.clone(),
        }
    }
}

/// Every event field except the identifier; the payload of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    #[serde(serialize_with = "serialize_time", deserialize_with = "deserialize_time")]
    pub time: NaiveTime,
    pub location: String,
    pub image: String,
}

impl EventDraft {
    /// Creates a draft with a title, date and time; the remaining fields start empty.
    pub fn new(title: impl Into<String>, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            date,
            time,
            location: String::new(),
            image: String::new(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Sets the image file name.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }
}

/// A selectable image offered by the backend for new and edited events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventImage {
    pub path: String,
    pub caption: String,
}
