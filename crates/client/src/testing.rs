//! In-memory [`EventsApi`] double for view and cache tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use eventdesk_core::event::{filter_events, ErrorBody, Event, EventDraft, EventImage, ListEventsQuery};

use crate::api::EventsApi;
use crate::error::{ClientError, Result};
use crate::query::AbortSignal;

/// Backend operations, for counting calls and injecting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    FetchEvents,
    FetchEvent,
    Create,
    Update,
    Delete,
    Images,
}

pub fn sample_event(id: &str, title: &str) -> Event {
    Event {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("About {}", title),
        date: NaiveDate::from_ymd_opt(2024, 10, 15).unwrap(),
        time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
        location: "Berlin".to_string(),
        image: format!("images/{}.jpg", id),
    }
}

pub fn sample_draft(title: &str) -> EventDraft {
    sample_event("draft", title).to_draft()
}

/// The backend requires every text field to be filled in.
fn is_incomplete(draft: &EventDraft) -> bool {
    [&draft.title, &draft.description, &draft.location, &draft.image]
        .iter()
        .any(|field| field.trim().is_empty())
}

#[derive(Default)]
pub struct FakeEventsApi {
    events: Mutex<Vec<Event>>,
    images: Vec<EventImage>,
    calls: Mutex<HashMap<Op, usize>>,
    failures: Mutex<HashMap<Op, (u16, String)>>,
    latency: Mutex<Duration>,
    next_id: AtomicUsize,
    updates: Mutex<Vec<EventDraft>>,
}

impl FakeEventsApi {
    pub fn with_events(events: Vec<Event>) -> Self {
        let next_id = AtomicUsize::new(events.len());
        Self {
            events: Mutex::new(events),
            images: vec![EventImage {
                path: "images/meetup.jpg".to_string(),
                caption: "People at a meetup".to_string(),
            }],
            next_id,
            ..Self::default()
        }
    }

    /// Every call sleeps this long first, unless its signal fires.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    /// Makes every later `op` call fail with a JSON error body.
    pub fn fail(&self, op: Op, status: u16, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(op, (status, message.to_string()));
    }

    pub fn calls(&self, op: Op) -> usize {
        self.calls.lock().unwrap().get(&op).copied().unwrap_or(0)
    }

    /// Bodies of every accepted update, oldest first.
    pub fn updates(&self) -> Vec<EventDraft> {
        self.updates.lock().unwrap().clone()
    }

    pub fn stored(&self, id: &str) -> Option<Event> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|event| event.id == id)
            .cloned()
    }

    async fn enter(&self, op: Op, signal: &AbortSignal) -> Result<()> {
        *self.calls.lock().unwrap().entry(op).or_default() += 1;

        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::select! {
                _ = signal.aborted() => return Err(ClientError::Aborted),
                _ = tokio::time::sleep(latency) => {}
            }
        }

        match self.failures.lock().unwrap().get(&op) {
            Some((status, message)) => Err(ClientError::Server {
                status: *status,
                message: message.clone(),
                info: Some(ErrorBody::new(message.clone())),
            }),
            None => Ok(()),
        }
    }

    fn invalid_data() -> ClientError {
        ClientError::Server {
            status: 400,
            message: "Invalid data provided.".to_string(),
            info: Some(ErrorBody::new("Invalid data provided.")),
        }
    }

    fn not_found() -> ClientError {
        ClientError::Server {
            status: 404,
            message: "Event not found".to_string(),
            info: Some(ErrorBody::new("Event not found")),
        }
    }
}

#[async_trait]
impl EventsApi for FakeEventsApi {
    fn base_url(&self) -> &str {
        "http://localhost:3000"
    }

    async fn fetch_events(&self, query: ListEventsQuery, signal: AbortSignal) -> Result<Vec<Event>> {
        self.enter(Op::FetchEvents, &signal).await?;
        Ok(filter_events(&self.events.lock().unwrap(), &query))
    }

    async fn fetch_event(&self, id: String, signal: AbortSignal) -> Result<Event> {
        self.enter(Op::FetchEvent, &signal).await?;
        self.stored(&id).ok_or_else(Self::not_found)
    }

    async fn create_event(&self, draft: EventDraft) -> Result<Event> {
        self.enter(Op::Create, &AbortSignal::never()).await?;
        if is_incomplete(&draft) {
            return Err(Self::invalid_data());
        }
        let id = format!("e{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let event = Event::from_draft(id, draft);
        self.events.lock().unwrap().push(event.clone());
        Ok(event)
    }

    async fn update_event(&self, id: String, draft: EventDraft) -> Result<Event> {
        self.enter(Op::Update, &AbortSignal::never()).await?;
        if is_incomplete(&draft) {
            return Err(Self::invalid_data());
        }
        self.updates.lock().unwrap().push(draft.clone());
        let mut events = self.events.lock().unwrap();
        let event = events
            .iter_mut()
            .find(|event| event.id == id)
            .ok_or_else(Self::not_found)?;
        *event = Event::from_draft(id, draft);
        Ok(event.clone())
    }

    async fn delete_event(&self, id: String) -> Result<()> {
        self.enter(Op::Delete, &AbortSignal::never()).await?;
        let mut events = self.events.lock().unwrap();
        let before = events.len();
        events.retain(|event| event.id != id);
        if events.len() == before {
            return Err(Self::not_found());
        }
        Ok(())
    }

    async fn fetch_selectable_images(&self, signal: AbortSignal) -> Result<Vec<EventImage>> {
        self.enter(Op::Images, &signal).await?;
        Ok(self.images.clone())
    }
}
