//! Client-side query cache.

mod client;
mod error;
mod mutation;
mod signal;

pub use client::{QueryClient, QueryObserver, QueryOptions, QueryState, RefetchType};
pub use error::QueryError;
pub use mutation::OptimisticUpdate;
pub use signal::{AbortController, AbortSignal};
