//! eventdesk_client - HTTP client, query cache and views for the eventdesk API.

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod query;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

pub use api::EventsApi;
pub use client::EventsClient;
pub use config::Config;
pub use error::{ClientError, Result};
pub use query::{QueryClient, QueryError};
