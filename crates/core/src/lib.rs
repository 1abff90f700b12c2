//! eventdesk_core - functional core for the eventdesk client.
//!
//! Pure data types and pure functions only. Everything that performs I/O
//! (HTTP, the query cache service, the terminal) lives in `eventdesk_client`.

pub mod event;
pub mod query;
pub mod route;
pub mod serde;
pub mod view;
