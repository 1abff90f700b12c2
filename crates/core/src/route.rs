//! Client-side route surface.
//!
//! Views return a [`Route`] instead of navigating themselves; the front end
//! decides what to do with it.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors that can occur when parsing a route path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("Unknown route: {0}")]
    Unknown(String),
}

/// A page of the event client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/events`: search and recently added events.
    Events,
    /// `/events/new`: create form.
    NewEvent,
    /// `/events/:id`: event details.
    EventDetails(String),
    /// `/events/:id/edit`: edit form.
    EditEvent(String),
}

impl Route {
    /// Parses a path. `/` redirects to `/events`; trailing slashes are ignored.
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let segments: Vec<&str> = path
            .split('?')
            .next()
            .unwrap_or_default()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        match segments.as_slice() {
            [] | ["events"] => Ok(Route::Events),
            ["events", "new"] => Ok(Route::NewEvent),
            ["events", id] => Ok(Route::EventDetails((*id).to_string())),
            ["events", id, "edit"] => Ok(Route::EditEvent((*id).to_string())),
            _ => Err(RouteError::Unknown(path.to_string())),
        }
    }

    /// Returns the path of this route.
    pub fn path(&self) -> String {
        match self {
            Route::Events => "/events".to_string(),
            Route::NewEvent => "/events/new".to_string(),
            Route::EventDetails(id) => format!("/events/{}", id),
            Route::EditEvent(id) => format!("/events/{}/edit", id),
        }
    }

    /// Returns the route one level up (`../`).
    pub fn parent(&self) -> Route {
        match self {
            Route::EditEvent(id) => Route::EventDetails(id.clone()),
            Route::Events | Route::NewEvent | Route::EventDetails(_) => Route::Events,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s)
    }
}
