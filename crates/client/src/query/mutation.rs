//! Optimistic mutation protocol.
//!
//! 1. [`QueryClient::begin_optimistic`] cancels in-flight fetches for the key,
//!    snapshots the cached value and writes the speculative value.
//! 2. The caller awaits its network action.
//! 3. [`OptimisticUpdate::settle`] commits on success or restores the
//!    snapshot on failure, then invalidates the key with an active refetch.
//!
//! [`QueryClient::mutate_optimistic`] runs all three phases in one call.

use std::future::Future;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use eventdesk_core::query::{QueryFilter, QueryKey};

use super::client::{QueryClient, RefetchType};
use super::error::QueryError;
use crate::error::ClientError;

/// A speculative cache write awaiting the outcome of its mutation.
///
/// Dropping an unsettled update rolls it back.
#[must_use = "an optimistic update must be committed or rolled back"]
#[derive(Debug)]
pub struct OptimisticUpdate {
    client: QueryClient,
    key: QueryKey,
    snapshot: Option<Value>,
    settled: bool,
}

impl OptimisticUpdate {
    /// The key the speculative value was written to.
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Keeps the speculative value.
    pub fn commit(mut self) {
        self.settled = true;
        tracing::debug!(key = %self.key, "Optimistic update committed");
    }

    /// Restores the value cached before the speculative write.
    pub fn rollback(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        self.settled = true;
        self.client.restore(&self.key, self.snapshot.take());
        tracing::warn!(key = %self.key, "Optimistic update rolled back");
    }

    /// Commits or rolls back according to `result`, then invalidates the key
    /// so the cache reconciles with the server either way.
    pub async fn settle<R>(self, result: Result<R, ClientError>) -> Result<R, QueryError> {
        let client = self.client.clone();
        let filter = QueryFilter::prefix(self.key.clone());

        match &result {
            Ok(_) => self.commit(),
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "Mutation failed");
                self.rollback();
            }
        }

        client.invalidate_queries(&filter, RefetchType::Active).await;
        result.map_err(QueryError::from)
    }
}

impl Drop for OptimisticUpdate {
    fn drop(&mut self) {
        if !self.settled {
            self.restore();
        }
    }
}

impl QueryClient {
    /// Phase one: cancels fetches for `key`, snapshots its data and writes
    /// `updater(previous)`.
    ///
    /// When the updater returns `None` nothing is written, but the snapshot is
    /// still taken so a rollback is exact.
    pub fn begin_optimistic<T, U>(&self, key: &QueryKey, updater: U) -> Result<OptimisticUpdate, QueryError>
    where
        T: Serialize + DeserializeOwned,
        U: FnOnce(Option<T>) -> Option<T>,
    {
        self.cancel_queries(&QueryFilter::prefix(key.clone()));

        let snapshot = self.snapshot(key);
        let previous = snapshot.clone().map(serde_json::from_value::<T>).transpose()?;

        match updater(previous) {
            Some(next) => {
                self.set_query_data(key, &next)?;
                tracing::debug!(%key, "Optimistic value written");
            }
            None => tracing::debug!(%key, "Nothing cached, skipping optimistic write"),
        }

        Ok(OptimisticUpdate {
            client: self.clone(),
            key: key.clone(),
            snapshot,
            settled: false,
        })
    }

    /// Runs the whole optimistic protocol around `action`.
    pub async fn mutate_optimistic<T, U, R, A, Fut>(
        &self,
        key: &QueryKey,
        updater: U,
        action: A,
    ) -> Result<R, QueryError>
    where
        T: Serialize + DeserializeOwned,
        U: FnOnce(Option<T>) -> Option<T>,
        A: FnOnce() -> Fut,
        Fut: Future<Output = Result<R, ClientError>>,
    {
        let update = self.begin_optimistic(key, updater)?;
        let result = action().await;
        update.settle(result).await
    }
}
