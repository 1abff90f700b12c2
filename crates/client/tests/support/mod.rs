//! In-process mock of the events backend.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use tokio::net::TcpListener;
use uuid::Uuid;

use eventdesk_core::event::{
    filter_events, ErrorBody, Event, EventDraft, EventEnvelope, EventImage, EventResponse,
    EventsResponse, ImagesResponse, ListEventsQuery,
};

#[derive(Default)]
pub struct BackendState {
    pub events: Mutex<Vec<Event>>,
    pub list_requests: AtomicUsize,
    pub detail_requests: AtomicUsize,
    /// Delay applied to every read, in milliseconds.
    pub read_delay_ms: AtomicU64,
    /// When set, mutations fail with 500 and this message.
    pub mutation_failure: Mutex<Option<String>>,
}

impl BackendState {
    pub fn stored(&self, id: &str) -> Option<Event> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|event| event.id == id)
            .cloned()
    }

    pub fn fail_mutations(&self, message: &str) {
        *self.mutation_failure.lock().unwrap() = Some(message.to_string());
    }

    async fn read_delay(&self) {
        let delay = self.read_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }

    fn mutation_failure(&self) -> Option<Response> {
        self.mutation_failure
            .lock()
            .unwrap()
            .clone()
            .map(|message| error(StatusCode::INTERNAL_SERVER_ERROR, &message))
    }
}

pub struct MockBackend {
    pub url: String,
    pub state: Arc<BackendState>,
}

pub fn sample_event(id: &str, title: &str) -> Event {
    Event {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("About {}", title),
        date: NaiveDate::from_ymd_opt(2024, 10, 15).unwrap(),
        time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
        location: "Berlin".to_string(),
        image: "meetup.jpg".to_string(),
    }
}

/// Starts the backend on an ephemeral port with the given events.
pub async fn spawn_backend(events: Vec<Event>) -> MockBackend {
    let state = Arc::new(BackendState {
        events: Mutex::new(events),
        ..BackendState::default()
    });

    let app = Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/images", get(list_images))
        .route(
            "/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .with_state(state.clone());

    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend {
        url: format!("http://{}", addr),
        state,
    }
}

/// Create and update bodies must carry every field, filled in.
fn is_incomplete(draft: &EventDraft) -> bool {
    [&draft.title, &draft.description, &draft.location, &draft.image]
        .iter()
        .any(|field| field.trim().is_empty())
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorBody::new(message))).into_response()
}

async fn list_events(
    State(state): State<Arc<BackendState>>,
    Query(query): Query<ListEventsQuery>,
) -> Json<EventsResponse> {
    state.list_requests.fetch_add(1, Ordering::SeqCst);
    state.read_delay().await;
    let events = filter_events(&state.events.lock().unwrap(), &query);
    Json(EventsResponse { events })
}

async fn list_images(State(state): State<Arc<BackendState>>) -> Json<ImagesResponse> {
    state.read_delay().await;
    Json(ImagesResponse {
        images: vec![EventImage {
            path: "meetup.jpg".to_string(),
            caption: "People at a meetup".to_string(),
        }],
    })
}

async fn get_event(State(state): State<Arc<BackendState>>, Path(id): Path<String>) -> Response {
    state.detail_requests.fetch_add(1, Ordering::SeqCst);
    state.read_delay().await;
    match state.stored(&id) {
        Some(event) => Json(EventResponse::new(event)).into_response(),
        None => error(StatusCode::NOT_FOUND, "Event not found"),
    }
}

async fn create_event(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<EventEnvelope<EventDraft>>,
) -> Response {
    if let Some(failure) = state.mutation_failure() {
        return failure;
    }
    if is_incomplete(&body.event) {
        return error(StatusCode::BAD_REQUEST, "Invalid data provided.");
    }
    let event = Event::from_draft(Uuid::new_v4().to_string(), body.event);
    state.events.lock().unwrap().push(event.clone());
    (StatusCode::CREATED, Json(EventResponse::new(event))).into_response()
}

async fn update_event(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<String>,
    Json(body): Json<EventEnvelope<EventDraft>>,
) -> Response {
    if let Some(failure) = state.mutation_failure() {
        return failure;
    }
    if is_incomplete(&body.event) {
        return error(StatusCode::BAD_REQUEST, "Invalid data provided.");
    }
    let mut events = state.events.lock().unwrap();
    match events.iter_mut().find(|event| event.id == id) {
        Some(event) => {
            *event = Event::from_draft(id, body.event);
            Json(EventResponse::new(event.clone())).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Event not found"),
    }
}

async fn delete_event(State(state): State<Arc<BackendState>>, Path(id): Path<String>) -> Response {
    if let Some(failure) = state.mutation_failure() {
        return failure;
    }
    let mut events = state.events.lock().unwrap();
    let before = events.len();
    events.retain(|event| event.id != id);
    if events.len() == before {
        return error(StatusCode::NOT_FOUND, "Event not found");
    }
    Json(serde_json::json!({ "message": "Event deleted" })).into_response()
}
