//! The query cache service.
//!
//! Results are cached per [`QueryKey`] as JSON values. Past capacity the
//! least recently used inactive keys (no observers, no fetch in flight) are
//! evicted; active keys are never dropped.
//! Concurrent observations of the same key share one in-flight fetch, and
//! every fetch carries an [`AbortSignal`] so it can be cancelled when its
//! observers unmount or when a mutation is about to write the key.
//!
//! The state lock is a `std::sync::Mutex` so observers can release their
//! subscription from `Drop`. It is never held across an await.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use futures_util::future::{join_all, BoxFuture, FutureExt, Shared};
use lru::LruCache;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use eventdesk_core::query::{needs_fetch, QueryFilter, QueryKey, QueryStatus};

use super::error::QueryError;
use super::signal::{AbortController, AbortSignal};
use crate::config::Config;
use crate::error::ClientError;

type FetchResult = Result<Value, QueryError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;
type Fetcher = Arc<dyn Fn(AbortSignal) -> BoxFuture<'static, FetchResult> + Send + Sync>;

/// Options for a single query observation.
#[derive(Debug, Clone, Copy)]
pub struct QueryOptions {
    /// Disabled queries never fetch; they only return what is cached.
    pub enabled: bool,
    /// Staleness window. `None` uses the client's default.
    pub stale_time: Option<Duration>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            stale_time: None,
        }
    }
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the query.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the staleness window.
    pub fn stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = Some(stale_time);
        self
    }
}

/// What `invalidate_queries` does after marking keys stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefetchType {
    /// Refetch invalidated keys that currently have observers.
    Active,
    /// Only mark; the next observation refetches.
    None,
}

/// Snapshot of a cached query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub error: Option<QueryError>,
    pub status: QueryStatus,
    pub is_fetching: bool,
    pub is_invalidated: bool,
}

impl<T> QueryState<T> {
    fn empty() -> Self {
        Self {
            data: None,
            error: None,
            status: QueryStatus::Pending,
            is_fetching: false,
            is_invalidated: false,
        }
    }

    /// No data yet and a fetch is running.
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Pending && self.is_fetching
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }
}

struct InFlight {
    id: u64,
    controller: AbortController,
    future: SharedFetch,
}

#[derive(Default)]
struct QueryEntry {
    data: Option<Value>,
    error: Option<QueryError>,
    updated_at: Option<Instant>,
    invalidated: bool,
    observers: usize,
    /// Last fetch function used for this key, kept for active refetches.
    fetcher: Option<Fetcher>,
    in_flight: Option<InFlight>,
}

impl QueryEntry {
    /// Aborts the running fetch, if any. Its result will be discarded.
    fn cancel_fetch(&mut self) -> bool {
        match self.in_flight.take() {
            Some(in_flight) => {
                in_flight.controller.abort();
                true
            }
            None => false,
        }
    }

    /// Unobserved and not fetching, so safe to evict.
    fn is_inactive(&self) -> bool {
        self.observers == 0 && self.in_flight.is_none()
    }

    fn write_data(&mut self, data: Value) {
        self.data = Some(data);
        self.error = None;
        self.updated_at = Some(Instant::now());
        self.invalidated = false;
    }
}

struct CacheState {
    /// Unbounded; `max_entries` is enforced by [`CacheState::evict_inactive`].
    entries: LruCache<QueryKey, QueryEntry>,
    max_entries: usize,
    next_fetch_id: u64,
}

impl CacheState {
    fn entry_mut(&mut self, key: &QueryKey) -> &mut QueryEntry {
        if !self.entries.contains(key) {
            self.entries.put(key.clone(), QueryEntry::default());
            self.evict_inactive(key);
        }
        self.entries.get_or_insert_mut(key.clone(), QueryEntry::default)
    }

    /// Drops least recently used inactive entries until the cache fits, never
    /// touching `keep`. Stays over capacity when only active entries remain.
    fn evict_inactive(&mut self, keep: &QueryKey) {
        let excess = self.entries.len().saturating_sub(self.max_entries);
        if excess == 0 {
            return;
        }
        let evictable: Vec<QueryKey> = self
            .entries
            .iter()
            .rev()
            .filter(|(key, entry)| *key != keep && entry.is_inactive())
            .take(excess)
            .map(|(key, _)| key.clone())
            .collect();
        for key in evictable {
            self.entries.pop(&key);
            tracing::debug!(%key, "Evicted inactive query");
        }
    }

    fn matching_keys(&self, filter: &QueryFilter) -> Vec<QueryKey> {
        self.entries
            .iter()
            .filter(|(key, _)| filter.matches(key))
            .map(|(key, _)| key.clone())
            .collect()
    }
}

fn lock_state(state: &Mutex<CacheState>) -> MutexGuard<'_, CacheState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn decode<T: DeserializeOwned>(value: Option<Value>) -> Result<Option<T>, QueryError> {
    value
        .map(serde_json::from_value)
        .transpose()
        .map_err(QueryError::from)
}

fn erase_fetcher<T, F, Fut>(fetcher: F) -> Fetcher
where
    T: Serialize + Send + 'static,
    F: Fn(AbortSignal) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
{
    Arc::new(move |signal: AbortSignal| {
        let fut = fetcher(signal);
        async move {
            match fut.await {
                Ok(data) => serde_json::to_value(data).map_err(QueryError::from),
                Err(err) => Err(QueryError::from(err)),
            }
        }
        .boxed()
    })
}

/// Stores a fetch result if the fetch is still the key's current one.
fn settle_fetch(state: &Mutex<CacheState>, key: &QueryKey, fetch_id: u64, result: &FetchResult) {
    let mut state = lock_state(state);
    let Some(entry) = state.entries.peek_mut(key) else {
        tracing::debug!(%key, "Query removed before its fetch settled");
        return;
    };
    if entry.in_flight.as_ref().map(|f| f.id) != Some(fetch_id) {
        tracing::debug!(%key, fetch_id, "Discarding superseded query result");
        return;
    }
    entry.in_flight = None;

    match result {
        Ok(value) => entry.write_data(value.clone()),
        Err(QueryError::Cancelled) => {}
        Err(err) => {
            tracing::debug!(%key, error = %err, "Query fetch failed");
            entry.error = Some(err.clone());
        }
    }
}

/// Keyed query cache shared by every view.
///
/// Cloning is cheap; all clones share the same cache.
#[derive(Clone)]
pub struct QueryClient {
    state: Arc<Mutex<CacheState>>,
    default_stale_time: Duration,
}

impl QueryClient {
    /// Creates a cache holding at most `max_entries` inactive keys.
    pub fn new(max_entries: usize, default_stale_time: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState {
                entries: LruCache::unbounded(),
                max_entries: max_entries.max(1),
                next_fetch_id: 0,
            })),
            default_stale_time,
        }
    }

    /// Creates a cache from the client configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cache_max_entries, config.stale_time())
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        lock_state(&self.state)
    }

    /// Resolves a query: cached data if fresh, the in-flight fetch if one is
    /// running, otherwise a new fetch.
    ///
    /// Returns `Ok(None)` only for a disabled query with nothing cached.
    pub async fn fetch_query<T, F, Fut>(
        &self,
        key: &QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> Result<Option<T>, QueryError>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: Fn(AbortSignal) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        if !options.enabled {
            return self.get_query_data(key);
        }
        let stale_time = options.stale_time.unwrap_or(self.default_stale_time);
        let fetcher = erase_fetcher(fetcher);

        let fetch = {
            let mut state = self.lock();
            let entry = state.entry_mut(key);
            entry.fetcher = Some(fetcher.clone());

            if !needs_fetch(entry.updated_at, entry.invalidated, Instant::now(), stale_time) {
                tracing::debug!(%key, "Query cache hit");
                return decode(entry.data.clone());
            }

            let joined = entry
                .in_flight
                .as_ref()
                .map(|in_flight| (in_flight.id, in_flight.future.clone()));
            match joined {
                Some((fetch_id, future)) => {
                    tracing::debug!(%key, fetch_id, "Joining in-flight query");
                    future
                }
                None => self.start_fetch(&mut state, key, fetcher),
            }
        };

        let value = fetch.await?;
        decode(Some(value))
    }

    fn start_fetch(&self, state: &mut CacheState, key: &QueryKey, fetcher: Fetcher) -> SharedFetch {
        state.next_fetch_id += 1;
        let fetch_id = state.next_fetch_id;
        let controller = AbortController::new();
        let signal = controller.signal();
        let cache: Weak<Mutex<CacheState>> = Arc::downgrade(&self.state);
        let settle_key = key.clone();

        let future = async move {
            let result = tokio::select! {
                biased;
                _ = signal.aborted() => Err(QueryError::Cancelled),
                result = fetcher(signal.clone()) => result,
            };
            if let Some(cache) = cache.upgrade() {
                settle_fetch(&cache, &settle_key, fetch_id, &result);
            }
            result
        }
        .boxed()
        .shared();

        state.entry_mut(key).in_flight = Some(InFlight {
            id: fetch_id,
            controller,
            future: future.clone(),
        });
        tracing::debug!(%key, fetch_id, "Query fetch started");
        future
    }

    /// Returns the cached data for a key without fetching.
    pub fn get_query_data<T: DeserializeOwned>(&self, key: &QueryKey) -> Result<Option<T>, QueryError> {
        let data = self
            .lock()
            .entries
            .get(key)
            .and_then(|entry| entry.data.clone());
        decode(data)
    }

    /// Overwrites the cached data for a key. The data counts as freshly fetched.
    pub fn set_query_data<T: Serialize>(&self, key: &QueryKey, data: &T) -> Result<(), QueryError> {
        let value = serde_json::to_value(data)?;
        self.lock().entry_mut(key).write_data(value);
        tracing::debug!(%key, "Query data set");
        Ok(())
    }

    /// Returns the raw cached value, used to snapshot before optimistic writes.
    pub(crate) fn snapshot(&self, key: &QueryKey) -> Option<Value> {
        self.lock()
            .entries
            .peek(key)
            .and_then(|entry| entry.data.clone())
    }

    /// Restores a snapshot taken with [`QueryClient::snapshot`].
    pub(crate) fn restore(&self, key: &QueryKey, snapshot: Option<Value>) {
        let mut state = self.lock();
        let entry = state.entry_mut(key);
        match snapshot {
            Some(value) => entry.write_data(value),
            None => {
                entry.data = None;
                entry.error = None;
                entry.updated_at = None;
            }
        }
    }

    /// Returns a snapshot of a key's state.
    pub fn query_state<T: DeserializeOwned>(&self, key: &QueryKey) -> QueryState<T> {
        let state = self.lock();
        let Some(entry) = state.entries.peek(key) else {
            return QueryState::empty();
        };

        let (data, decode_error) = match decode(entry.data.clone()) {
            Ok(data) => (data, None),
            Err(err) => (None, Some(err)),
        };
        let error = entry.error.clone().or(decode_error);

        QueryState {
            status: QueryStatus::from_parts(data.is_some(), error.is_some()),
            data,
            error,
            is_fetching: entry.in_flight.is_some(),
            is_invalidated: entry.invalidated,
        }
    }

    /// Returns true while a fetch is running for the key.
    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.lock()
            .entries
            .peek(key)
            .is_some_and(|entry| entry.in_flight.is_some())
    }

    /// Returns the number of mounted observers of a key.
    pub fn observer_count(&self, key: &QueryKey) -> usize {
        self.lock()
            .entries
            .peek(key)
            .map_or(0, |entry| entry.observers)
    }

    /// Registers a mounted view as an observer of a key.
    pub fn observe(&self, key: QueryKey) -> QueryObserver {
        self.lock().entry_mut(&key).observers += 1;
        QueryObserver {
            cache: Arc::downgrade(&self.state),
            key,
        }
    }

    /// Aborts in-flight fetches for matching keys and discards their results.
    ///
    /// Returns the number of fetches cancelled.
    pub fn cancel_queries(&self, filter: &QueryFilter) -> usize {
        let mut state = self.lock();
        let mut cancelled = 0;
        for key in state.matching_keys(filter) {
            if let Some(entry) = state.entries.peek_mut(&key) {
                if entry.cancel_fetch() {
                    cancelled += 1;
                }
            }
        }
        if cancelled > 0 {
            tracing::debug!(key = %filter.key(), cancelled, "Cancelled in-flight queries");
        }
        cancelled
    }

    /// Marks matching keys stale and, for [`RefetchType::Active`], refetches
    /// the observed ones and waits for them.
    ///
    /// Returns the number of keys invalidated.
    pub async fn invalidate_queries(&self, filter: &QueryFilter, refetch: RefetchType) -> usize {
        let (matched, refetches) = {
            let mut state = self.lock();
            let keys = state.matching_keys(filter);
            let mut refetches = Vec::new();

            for key in &keys {
                let Some(entry) = state.entries.peek_mut(key) else {
                    continue;
                };
                entry.invalidated = true;
                if refetch != RefetchType::Active || entry.observers == 0 {
                    continue;
                }
                let Some(fetcher) = entry.fetcher.clone() else {
                    continue;
                };
                entry.cancel_fetch();
                refetches.push(self.start_fetch(&mut state, key, fetcher));
            }

            tracing::debug!(
                key = %filter.key(),
                matched = keys.len(),
                refetching = refetches.len(),
                "Invalidated queries"
            );
            (keys.len(), refetches)
        };

        // Refetch failures are stored on their keys.
        join_all(refetches).await;
        matched
    }

    /// Drops matching keys from the cache, cancelling their fetches.
    pub fn remove_queries(&self, filter: &QueryFilter) -> usize {
        let mut state = self.lock();
        let keys = state.matching_keys(filter);
        for key in &keys {
            if let Some(mut entry) = state.entries.pop(key) {
                entry.cancel_fetch();
            }
        }
        keys.len()
    }

    /// Cancels every fetch and empties the cache.
    pub fn clear(&self) {
        let mut state = self.lock();
        for (_, entry) in state.entries.iter_mut() {
            entry.cancel_fetch();
        }
        state.entries.clear();
        tracing::debug!("Query cache cleared");
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("entries", &self.len())
            .field("default_stale_time", &self.default_stale_time)
            .finish()
    }
}

/// A mounted view's subscription to a key.
///
/// Keys with observers are refetched by active invalidation. Dropping the
/// last observer of a key cancels its in-flight fetch.
#[derive(Debug)]
pub struct QueryObserver {
    cache: Weak<Mutex<CacheState>>,
    key: QueryKey,
}

impl QueryObserver {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

impl Drop for QueryObserver {
    fn drop(&mut self) {
        let Some(cache) = self.cache.upgrade() else {
            return;
        };
        let mut state = lock_state(&cache);
        if let Some(entry) = state.entries.peek_mut(&self.key) {
            entry.observers = entry.observers.saturating_sub(1);
            if entry.observers == 0 && entry.cancel_fetch() {
                tracing::debug!(key = %self.key, "Last observer unmounted, fetch cancelled");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventdesk_core::query::{event_key, events_key, events_search_key, recent_events_key};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn client() -> QueryClient {
        QueryClient::new(100, Duration::ZERO)
    }

    /// Fetcher returning `value` after `delay`, counting its invocations.
    fn counting(
        calls: &Arc<AtomicUsize>,
        value: &'static str,
        delay: Duration,
    ) -> impl Fn(AbortSignal) -> BoxFuture<'static, Result<String, ClientError>> + Send + Sync + 'static
    {
        let calls = calls.clone();
        move |_signal| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                Ok(value.to_string())
            }
            .boxed()
        }
    }

    fn failing() -> impl Fn(AbortSignal) -> BoxFuture<'static, Result<String, ClientError>> + Send + Sync + 'static
    {
        |_signal| {
            async {
                Err(ClientError::Server {
                    status: 500,
                    message: "boom".to_string(),
                    info: None,
                })
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_fetch_populates_cache() {
        let cache = client();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = events_key();

        let data: Option<String> = cache
            .fetch_query(&key, QueryOptions::new(), counting(&calls, "a", Duration::ZERO))
            .await
            .unwrap();

        assert_eq!(data.as_deref(), Some("a"));
        assert_eq!(cache.get_query_data::<String>(&key).unwrap().as_deref(), Some("a"));
        assert!(cache.query_state::<String>(&key).is_success());
    }

    #[tokio::test]
    async fn test_fresh_data_skips_fetch() {
        let cache = client();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = recent_events_key(3);
        let options = QueryOptions::new().stale_time(Duration::from_secs(5));

        for _ in 0..3 {
            let _: Option<String> = cache
                .fetch_query(&key, options, counting(&calls, "a", Duration::ZERO))
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_stale_time_refetches() {
        let cache = client();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = events_key();

        for _ in 0..2 {
            let _: Option<String> = cache
                .fetch_query(&key, QueryOptions::new(), counting(&calls, "a", Duration::ZERO))
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_request() {
        let cache = client();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = events_search_key("rust");

        let first = cache.fetch_query::<String, _, _>(
            &key,
            QueryOptions::new(),
            counting(&calls, "a", Duration::from_millis(50)),
        );
        let second = cache.fetch_query::<String, _, _>(
            &key,
            QueryOptions::new(),
            counting(&calls, "b", Duration::from_millis(50)),
        );
        let (first, second) = tokio::join!(first, second);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.unwrap().as_deref(), Some("a"));
        assert_eq!(second.unwrap().as_deref(), Some("a"));
        assert!(!cache.is_fetching(&key));
    }

    #[tokio::test]
    async fn test_disabled_query_never_fetches() {
        let cache = client();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = events_search_key("");

        let data: Option<String> = cache
            .fetch_query(
                &key,
                QueryOptions::new().enabled(false),
                counting(&calls, "a", Duration::ZERO),
            )
            .await
            .unwrap();

        assert_eq!(data, None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_error_is_stored_and_data_kept() {
        let cache = client();
        let key = event_key("e1");
        cache.set_query_data(&key, &"cached".to_string()).unwrap();

        let result = cache
            .fetch_query::<String, _, _>(&key, QueryOptions::new(), failing())
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.status(), Some(500));
        let state = cache.query_state::<String>(&key);
        assert!(state.is_error());
        assert_eq!(state.data.as_deref(), Some("cached"));
    }

    #[tokio::test]
    async fn test_invalidate_marks_fresh_data_stale() {
        let cache = client();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = event_key("e1");
        let options = QueryOptions::new().stale_time(Duration::from_secs(60));

        let _: Option<String> = cache
            .fetch_query(&key, options, counting(&calls, "a", Duration::ZERO))
            .await
            .unwrap();
        let matched = cache
            .invalidate_queries(&QueryFilter::prefix(events_key()), RefetchType::None)
            .await;
        assert_eq!(matched, 1);
        assert!(cache.query_state::<String>(&key).is_invalidated);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let _: Option<String> = cache
            .fetch_query(&key, options, counting(&calls, "a", Duration::ZERO))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!cache.query_state::<String>(&key).is_invalidated);
    }

    #[tokio::test]
    async fn test_active_invalidation_refetches_observed_keys() {
        let cache = client();
        let calls = Arc::new(AtomicUsize::new(0));
        let observed = event_key("e1");
        let unobserved = event_key("e2");

        let _observer = cache.observe(observed.clone());
        let _: Option<String> = cache
            .fetch_query(&observed, QueryOptions::new(), counting(&calls, "a", Duration::ZERO))
            .await
            .unwrap();
        let _: Option<String> = cache
            .fetch_query(&unobserved, QueryOptions::new(), counting(&calls, "b", Duration::ZERO))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        cache
            .invalidate_queries(&QueryFilter::prefix(events_key()), RefetchType::Active)
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(!cache.query_state::<String>(&observed).is_invalidated);
        assert!(cache.query_state::<String>(&unobserved).is_invalidated);
    }

    #[tokio::test]
    async fn test_cancelled_fetch_does_not_overwrite() {
        let cache = client();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = event_key("e1");

        let pending = tokio::spawn({
            let cache = cache.clone();
            let key = key.clone();
            let fetcher = counting(&calls, "server", Duration::from_millis(100));
            async move {
                cache
                    .fetch_query::<String, _, _>(&key, QueryOptions::new(), fetcher)
                    .await
            }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(cache.is_fetching(&key));

        assert_eq!(cache.cancel_queries(&QueryFilter::exact(key.clone())), 1);
        cache.set_query_data(&key, &"optimistic".to_string()).unwrap();

        let result = pending.await.unwrap();
        assert!(result.unwrap_err().is_cancelled());
        assert_eq!(
            cache.get_query_data::<String>(&key).unwrap().as_deref(),
            Some("optimistic")
        );
    }

    #[tokio::test]
    async fn test_last_observer_drop_cancels_fetch() {
        let cache = client();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = event_key("e1");
        let observer = cache.observe(key.clone());
        assert_eq!(cache.observer_count(&key), 1);

        let pending = tokio::spawn({
            let cache = cache.clone();
            let key = key.clone();
            let fetcher = counting(&calls, "server", Duration::from_secs(5));
            async move {
                cache
                    .fetch_query::<String, _, _>(&key, QueryOptions::new(), fetcher)
                    .await
            }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        drop(observer);

        let result = tokio::time::timeout(Duration::from_secs(1), pending)
            .await
            .expect("fetch was not cancelled")
            .unwrap();
        assert!(result.unwrap_err().is_cancelled());
        assert_eq!(cache.observer_count(&key), 0);
        assert!(!cache.is_fetching(&key));
    }

    #[tokio::test]
    async fn test_remove_queries() {
        let cache = client();
        cache.set_query_data(&event_key("e1"), &1).unwrap();
        cache.set_query_data(&event_key("e2"), &2).unwrap();

        assert_eq!(cache.remove_queries(&QueryFilter::exact(event_key("e1"))), 1);
        assert_eq!(cache.get_query_data::<i32>(&event_key("e1")).unwrap(), None);
        assert_eq!(cache.get_query_data::<i32>(&event_key("e2")).unwrap(), Some(2));
    }

    #[test]
    fn test_restore_empty_snapshot_clears_data() {
        let cache = client();
        let key = event_key("e1");
        let snapshot = cache.snapshot(&key);
        cache.set_query_data(&key, &"speculative").unwrap();

        cache.restore(&key, snapshot);

        let state = cache.query_state::<String>(&key);
        assert_eq!(state.data, None);
        assert_eq!(state.status, QueryStatus::Pending);
    }

    #[test]
    fn test_lru_eviction() {
        let cache = QueryClient::new(2, Duration::ZERO);
        cache.set_query_data(&event_key("e1"), &1).unwrap();
        cache.set_query_data(&event_key("e2"), &2).unwrap();

        // Touch e1 so e2 is least recently used
        cache.get_query_data::<i32>(&event_key("e1")).unwrap();
        cache.set_query_data(&event_key("e3"), &3).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_query_data::<i32>(&event_key("e1")).unwrap(), Some(1));
        assert_eq!(cache.get_query_data::<i32>(&event_key("e2")).unwrap(), None);
    }

    #[tokio::test]
    async fn test_eviction_skips_observed_and_fetching_keys() {
        let cache = QueryClient::new(1, Duration::ZERO);
        let calls = Arc::new(AtomicUsize::new(0));
        let observed = event_key("e1");
        let observer = cache.observe(observed.clone());

        let pending = tokio::spawn({
            let cache = cache.clone();
            let key = observed.clone();
            let fetcher = counting(&calls, "server", Duration::from_millis(50));
            async move {
                cache
                    .fetch_query::<String, _, _>(&key, QueryOptions::new(), fetcher)
                    .await
            }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.set_query_data(&event_key("e2"), &2).unwrap();

        let data = pending.await.unwrap().unwrap();
        assert_eq!(data.as_deref(), Some("server"));
        let state = cache.query_state::<String>(&observed);
        assert_eq!(state.data.as_deref(), Some("server"));
        assert!(state.is_success());
        assert_eq!(cache.observer_count(&observed), 1);
        assert_eq!(cache.len(), 2);

        // Once unmounted the key is ordinary LRU garbage again
        drop(observer);
        cache.set_query_data(&event_key("e3"), &3).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_query_data::<String>(&observed).unwrap(), None);
        assert_eq!(cache.get_query_data::<i32>(&event_key("e3")).unwrap(), Some(3));
    }

    #[test]
    fn test_decode_mismatch_is_error() {
        let cache = client();
        let key = events_key();
        cache.set_query_data(&key, &"not a number").unwrap();

        assert!(cache.get_query_data::<i32>(&key).is_err());
        let state = cache.query_state::<i32>(&key);
        assert!(matches!(state.error, Some(QueryError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = client();
        cache.set_query_data(&events_key(), &1).unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
