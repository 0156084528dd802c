use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::api::ApiError;

use super::QueryKey;

/// Retry bound applied when a query does not choose its own.
pub const DEFAULT_RETRY: u32 = 1;

/// Pause between a failed attempt and its retry
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

type AnyValue = Arc<dyn Any + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, Result<AnyValue, ApiError>>>;

/// Freshness and failure policy for one query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// How long after a successful fetch the value is served without I/O
    pub stale_time: Duration,
    /// Extra attempts after the first failure
    pub retry: u32,
    pub retry_delay: Duration,
}

impl QueryOptions {
    pub fn stale_after(stale_time: Duration) -> Self {
        Self {
            stale_time,
            retry: DEFAULT_RETRY,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Snapshot of a cache entry as returned by `QueryCache::peek`
#[derive(Debug, Clone)]
pub struct Cached<T> {
    pub value: Arc<T>,
    pub fetched_at: Instant,
}

impl<T> Cached<T> {
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    pub fn is_stale(&self, stale_time: Duration) -> bool {
        self.age() >= stale_time
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age().as_secs() / 60;
        if minutes < 1 {
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                // Round up: 1h 30m+ becomes 2h
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}

/// Consumer-facing status of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
    Loading,
    Error(ApiError),
    Success(Arc<T>),
}

impl<T> QueryState<T> {
    pub fn data(&self) -> Option<&Arc<T>> {
        match self {
            QueryState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            QueryState::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }
}

impl<T> From<Result<Arc<T>, ApiError>> for QueryState<T> {
    fn from(result: Result<Arc<T>, ApiError>) -> Self {
        match result {
            Ok(data) => QueryState::Success(data),
            Err(e) => QueryState::Error(e),
        }
    }
}

struct Entry {
    value: AnyValue,
    fetched_at: Instant,
}

impl Entry {
    fn is_fresh(&self, stale_time: Duration) -> bool {
        self.fetched_at.elapsed() < stale_time
    }
}

struct InFlight {
    id: u64,
    fetch: SharedFetch,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<QueryKey, Entry>,
    in_flight: HashMap<QueryKey, InFlight>,
    next_fetch_id: u64,
}

/// Session-wide query cache. Clone is cheap; clones share one store.
#[derive(Clone, Default)]
pub struct QueryCache {
    state: Arc<Mutex<CacheState>>,
}

impl QueryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `key`, fetching with `fetcher` when the entry is missing or stale.
    ///
    /// A fresh entry is returned without calling `fetcher`. While a fetch for
    /// `key` is outstanding every caller awaits that same fetch. The fetch runs
    /// as its own task: dropping the caller does not cancel it, and its result
    /// still lands in the cache.
    ///
    /// A failed refresh surfaces the error but leaves the previous value in
    /// place (still stale) where `peek` can reach it.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> Result<Arc<T>, ApiError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let pending = {
            let mut state = self.state.lock().await;

            if let Some(entry) = state.entries.get(&key) {
                if entry.is_fresh(options.stale_time) {
                    match Arc::clone(&entry.value).downcast::<T>() {
                        Ok(value) => {
                            debug!(key = %key, "Cache hit");
                            return Ok(value);
                        }
                        Err(_) => warn!(key = %key, "Cached value has unexpected type, refetching"),
                    }
                }
            }

            if let Some(in_flight) = state.in_flight.get(&key) {
                debug!(key = %key, "Joining in-flight fetch");
                in_flight.fetch.clone()
            } else {
                debug!(key = %key, "Cache miss, fetching");
                let id = state.next_fetch_id;
                state.next_fetch_id += 1;
                let fetch = self.spawn_fetch(key.clone(), id, options, fetcher);
                state.in_flight.insert(
                    key.clone(),
                    InFlight {
                        id,
                        fetch: fetch.clone(),
                    },
                );
                fetch
            }
        };

        pending.await?.downcast::<T>().map_err(|_| {
            ApiError::Decode(format!("Cached value for {} has unexpected type", key))
        })
    }

    fn spawn_fetch<T, F, Fut>(
        &self,
        key: QueryKey,
        id: u64,
        options: QueryOptions,
        fetcher: F,
    ) -> SharedFetch
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let state = Arc::clone(&self.state);

        let task = tokio::spawn(async move {
            let result = fetch_with_retry(&key, &options, &fetcher).await;

            let mut state = state.lock().await;
            // Invalidation while in flight detaches this fetch; it must not
            // settle the key it no longer owns.
            let owns_key = state.in_flight.get(&key).map(|f| f.id) == Some(id);
            if owns_key {
                state.in_flight.remove(&key);
            }

            let value: AnyValue = Arc::new(result?);
            if owns_key {
                state.entries.insert(
                    key,
                    Entry {
                        value: Arc::clone(&value),
                        fetched_at: Instant::now(),
                    },
                );
            }
            Ok::<AnyValue, ApiError>(value)
        });

        async move {
            task.await
                .unwrap_or_else(|e| Err(ApiError::Network(format!("Fetch task failed: {}", e))))
        }
        .boxed()
        .shared()
    }

    /// Last successfully fetched value for `key`, fresh or not
    pub async fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Cached<T>> {
        let state = self.state.lock().await;
        let entry = state.entries.get(key)?;
        let value = Arc::clone(&entry.value).downcast::<T>().ok()?;
        Some(Cached {
            value,
            fetched_at: entry.fetched_at,
        })
    }

    pub async fn is_fetching(&self, key: &QueryKey) -> bool {
        self.state.lock().await.in_flight.contains_key(key)
    }

    /// Evict one entry. Returns whether anything was removed.
    pub async fn invalidate(&self, key: &QueryKey) -> bool {
        let mut state = self.state.lock().await;
        let in_flight = state.in_flight.remove(key).is_some();
        let cached = state.entries.remove(key).is_some();
        debug!(key = %key, "Invalidated");
        cached || in_flight
    }

    /// Evict every entry at or below `prefix`. Returns the number of cached values removed.
    pub async fn invalidate_prefix(&self, prefix: &QueryKey) -> usize {
        let mut state = self.state.lock().await;
        state.in_flight.retain(|k, _| !k.starts_with(prefix));
        let before = state.entries.len();
        state.entries.retain(|k, _| !k.starts_with(prefix));
        let removed = before - state.entries.len();
        debug!(prefix = %prefix, removed, "Invalidated prefix");
        removed
    }

    /// Session teardown: drop every entry and detach every in-flight fetch
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.entries.clear();
        state.in_flight.clear();
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

async fn fetch_with_retry<T, F, Fut>(
    key: &QueryKey,
    options: &QueryOptions,
    fetcher: &F,
) -> Result<T, ApiError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 0;
    loop {
        match fetcher().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < options.retry => {
                attempt += 1;
                warn!(key = %key, attempt, error = %e, "Fetch failed, retrying");
                tokio::time::sleep(options.retry_delay).await;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Fetch failed, giving up");
                return Err(e);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const WINDOW: Duration = Duration::from_secs(120);

    fn counting_fetcher(
        calls: Arc<AtomicUsize>,
    ) -> impl Fn() -> BoxFuture<'static, Result<u32, ApiError>> + Send + Sync + 'static {
        move || {
            let calls = Arc::clone(&calls);
            async move { Ok(calls.fetch_add(1, Ordering::SeqCst) as u32 + 1) }.boxed()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_entry_served_without_fetch() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new(["n"]);
        let options = QueryOptions::stale_after(WINDOW);

        let first = cache
            .fetch(key.clone(), options, counting_fetcher(Arc::clone(&calls)))
            .await
            .expect("first fetch");
        tokio::time::advance(WINDOW - Duration::from_secs(1)).await;
        let second = cache
            .fetch(key.clone(), options, counting_fetcher(Arc::clone(&calls)))
            .await
            .expect("second fetch");

        assert_eq!(*first, 1);
        assert_eq!(*second, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_entry_refetched_and_replaced() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new(["n"]);
        let options = QueryOptions::stale_after(WINDOW);

        cache
            .fetch(key.clone(), options, counting_fetcher(Arc::clone(&calls)))
            .await
            .expect("first fetch");
        tokio::time::advance(WINDOW).await;
        let refreshed = cache
            .fetch(key.clone(), options, counting_fetcher(Arc::clone(&calls)))
            .await
            .expect("refresh");

        assert_eq!(*refreshed, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let peeked = cache.peek::<u32>(&key).await.expect("entry present");
        assert_eq!(*peeked.value, 2);
        assert!(!peeked.is_stale(WINDOW));
    }

    #[tokio::test]
    async fn test_peek_wrong_type_is_none() {
        let cache = QueryCache::new();
        let key = QueryKey::new(["n"]);
        cache
            .fetch(key.clone(), QueryOptions::stale_after(WINDOW), || async {
                Ok::<_, ApiError>(7u32)
            })
            .await
            .expect("fetch");

        assert!(cache.peek::<String>(&key).await.is_none());
        assert_eq!(*cache.peek::<u32>(&key).await.expect("u32 entry").value, 7);
    }

    #[tokio::test]
    async fn test_invalidate_prefix_and_clear() {
        let cache = QueryCache::new();
        let options = QueryOptions::stale_after(WINDOW);
        for key in [
            QueryKey::new(["rides", "detail", "1"]),
            QueryKey::new(["rides", "detail", "1", "participants"]),
            QueryKey::new(["rides", "detail", "2"]),
        ] {
            cache
                .fetch(key, options, || async { Ok::<_, ApiError>(()) })
                .await
                .expect("fetch");
        }
        assert_eq!(cache.len().await, 3);

        let removed = cache
            .invalidate_prefix(&QueryKey::new(["rides", "detail", "1"]))
            .await;
        assert_eq!(removed, 2);
        assert!(cache.invalidate(&QueryKey::new(["rides", "detail", "2"])).await);
        assert!(!cache.invalidate(&QueryKey::new(["rides", "detail", "2"])).await);
        assert!(cache.is_empty().await);

        cache
            .fetch(QueryKey::new(["x"]), options, || async { Ok::<_, ApiError>(()) })
            .await
            .expect("fetch");
        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cached_age_display() {
        let cached = Cached {
            value: Arc::new(()),
            fetched_at: Instant::now(),
        };
        assert_eq!(cached.age_display(), "just now");

        tokio::time::advance(Duration::from_secs(5 * 60)).await;
        assert_eq!(cached.age_display(), "5m ago");

        tokio::time::advance(Duration::from_secs(90 * 60)).await;
        assert_eq!(cached.age_display(), "2h ago");
    }

    #[test]
    fn test_query_state_from_result() {
        let ok: QueryState<u32> = Ok(Arc::new(3)).into();
        assert_eq!(ok.data().map(|d| **d), Some(3));
        assert!(!ok.is_loading());

        let err: QueryState<u32> = Err(ApiError::NotFound("ride".into())).into();
        assert!(err.data().is_none());
        assert!(err.error().is_some_and(ApiError::is_not_found));
    }
}
