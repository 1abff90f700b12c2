//! HTTP client for the eventdesk API.

pub mod events;
pub mod images;

use std::future::Future;

use eventdesk_core::event::ErrorBody;
use reqwest::StatusCode;

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::query::AbortSignal;

/// HTTP client for the eventdesk API.
#[derive(Debug, Clone)]
pub struct EventsClient {
    client: reqwest::Client,
    base_url: String,
}

impl EventsClient {
    /// Create a new client with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: normalize_base_url(base_url.into()),
        }
    }

    /// Create a client from configuration, applying the request timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: normalize_base_url(config.base_url.clone()),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a URL for an endpoint.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build the URL of a single event.
    fn event_url(&self, id: &str) -> String {
        self.url(&format!("/events/{}", urlencoding::encode(id)))
    }

    /// Decode a successful response body or normalize the failure.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(response).await);
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Handle delete responses (body ignored).
    async fn handle_delete_response(&self, response: reqwest::Response) -> Result<()> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }
}

fn normalize_base_url(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Build a [`ClientError::Server`] from a non-success response.
///
/// `info` holds the JSON body when the backend sent one. The message prefers
/// the body's `message`, then the raw text, then the status reason.
async fn error_from_response(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let path = response.url().path().to_string();
    let text = response.text().await.unwrap_or_default();
    let info: Option<ErrorBody> = serde_json::from_str(&text).ok();

    let message = info
        .as_ref()
        .and_then(|body| body.message.clone())
        .or_else(|| Some(text.trim().to_string()).filter(|t| !t.is_empty()))
        .unwrap_or_else(|| default_reason(status));

    tracing::debug!(status = status.as_u16(), %path, %message, "Request failed");
    ClientError::Server {
        status: status.as_u16(),
        message,
        info,
    }
}

fn default_reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

/// Race a request against an abort signal. The request is dropped on abort.
async fn abortable<T>(signal: &AbortSignal, request: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::select! {
        biased;
        _ = signal.aborted() => Err(ClientError::Aborted),
        result = request => result,
    }
}
