//! Renderable view content.
//!
//! Views in `eventdesk_client` compute one of these values; the front end
//! only decides how to print it.

use std::fmt;

use serde::Serialize;

/// An inline error panel with a title and a best-effort message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBlock {
    pub title: String,
    pub message: String,
}

impl ErrorBlock {
    /// Builds an error block, preferring the backend's message over the fallback.
    pub fn new(title: impl Into<String>, info_message: Option<&str>, fallback: &str) -> Self {
        Self {
            title: title.into(),
            message: error_message(info_message, fallback),
        }
    }
}

impl fmt::Display for ErrorBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

impl std::error::Error for ErrorBlock {}

/// Returns the backend's message when it has one, otherwise the fallback.
pub fn error_message(info_message: Option<&str>, fallback: &str) -> String {
    info_message
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// What a content section currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "content", rename_all = "snake_case")]
pub enum SectionContent<T> {
    /// Nothing requested yet; holds the prompt text.
    Prompt(String),
    /// A request is in flight and there is nothing to show yet.
    Loading,
    /// The last request failed. `stale` is the data cached before the
    /// failure, shown alongside the error.
    Error {
        error: ErrorBlock,
        #[serde(skip_serializing_if = "Option::is_none")]
        stale: Option<T>,
    },
    /// The data to show.
    Loaded(T),
}

impl<T> SectionContent<T> {
    /// Returns the loaded data, if any.
    pub fn data(&self) -> Option<&T> {
        match self {
            SectionContent::Loaded(data) => Some(data),
            _ => None,
        }
    }

    /// Returns the error block, if any.
    pub fn error(&self) -> Option<&ErrorBlock> {
        match self {
            SectionContent::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Returns the data cached before a failed request, if any.
    pub fn stale_data(&self) -> Option<&T> {
        match self {
            SectionContent::Error { stale, .. } => stale.as_ref(),
            _ => None,
        }
    }

    /// Returns true while loading.
    pub fn is_loading(&self) -> bool {
        matches!(self, SectionContent::Loading)
    }

    /// Maps the loaded data.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SectionContent<U> {
        match self {
            SectionContent::Prompt(prompt) => SectionContent::Prompt(prompt),
            SectionContent::Loading => SectionContent::Loading,
            SectionContent::Error { error, stale } => SectionContent::Error {
                error,
                stale: stale.map(f),
            },
            SectionContent::Loaded(data) => SectionContent::Loaded(f(data)),
        }
    }
}
