//! Process-wide query cache with an explicit invalidation contract.
//!
//! Every read of backend data goes through [`QueryCache::fetch`] under a
//! [`QueryKey`] whose first element is the entity's logical name. A successful
//! mutation calls [`QueryCache::invalidate_entity`], which evicts every key of
//! that entity (and of the entities embedding it) so the next read refetches.
//! Observers can follow stores and evictions through [`QueryCache::subscribe`].
//!
//! Entries older than [`CacheLimits::stale_after`] count as misses, and the
//! store never holds more than [`CacheLimits::max_entries`] results.

use std::any::Any;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::domain::entity::EntityKind;
use crate::domain::types::EntityId;

const EVENT_CAPACITY: usize = 256;

/// One element of a cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum KeyPart {
    Text(String),
    Number(u64),
    Flag(bool),
}

impl Display for KeyPart {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyPart::Text(value) => write!(f, "{value}"),
            KeyPart::Number(value) => write!(f, "{value}"),
            KeyPart::Flag(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        KeyPart::Text(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        KeyPart::Text(value)
    }
}

impl From<&EntityId> for KeyPart {
    fn from(value: &EntityId) -> Self {
        KeyPart::Text(value.as_str().to_string())
    }
}

impl From<usize> for KeyPart {
    fn from(value: usize) -> Self {
        KeyPart::Number(value as u64)
    }
}

impl From<bool> for KeyPart {
    fn from(value: bool) -> Self {
        KeyPart::Flag(value)
    }
}

/// Ordered tuple identifying a cached query result.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    /// Starts a key scoped to `kind`.
    pub fn entity(kind: EntityKind) -> Self {
        Self(vec![KeyPart::from(kind.name())])
    }

    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.0.push(part.into());
        self
    }

    /// Logical entity name the key belongs to.
    pub fn entity_name(&self) -> Option<&str> {
        match self.0.first() {
            Some(KeyPart::Text(name)) => Some(name),
            _ => None,
        }
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }
}

impl Display for QueryKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Notification published to cache subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheEvent {
    Stored(QueryKey),
    Invalidated(QueryKey),
}

/// Errors that may be worth a silent retry.
pub trait TransientError {
    fn is_transient(&self) -> bool;
}

/// Retry policy for reads. Mutations never go through it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure.
    pub attempts: u32,
    /// Delay before the first retry; grows linearly with each attempt.
    pub backoff: Duration,
}

/// Freshness and size bounds of the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheLimits {
    /// Age after which a stored result is fetched again.
    pub stale_after: Duration,
    /// Most results held at once; the oldest goes first.
    pub max_entries: usize,
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(30),
            max_entries: 1000,
        }
    }
}

type CachedValue = Arc<dyn Any + Send + Sync>;

struct Entry {
    value: CachedValue,
    stored_at: Instant,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<QueryKey, Entry>,
    generations: HashMap<String, u64>,
}

impl CacheState {
    fn generation(&self, key: &QueryKey) -> u64 {
        key.entity_name()
            .and_then(|name| self.generations.get(name))
            .copied()
            .unwrap_or(0)
    }

    /// Live value under `key`. An expired entry is dropped on the way.
    fn fresh(&mut self, key: &QueryKey, stale_after: Duration) -> Option<CachedValue> {
        let entry = self.entries.get(key)?;
        if entry.stored_at.elapsed() < stale_after {
            return Some(entry.value.clone());
        }
        self.entries.remove(key);
        None
    }

    /// Makes room for `key`: expired entries go first, then the oldest ones.
    fn make_room(&mut self, key: &QueryKey, limits: CacheLimits) {
        self.entries
            .retain(|_, entry| entry.stored_at.elapsed() < limits.stale_after);
        let capacity = limits.max_entries.max(1);
        while !self.entries.contains_key(key) && self.entries.len() >= capacity {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            log::debug!("Cache full, dropping {oldest}");
            self.entries.remove(&oldest);
        }
    }
}

/// Shared key-value store of query results.
#[derive(Clone)]
pub struct QueryCache {
    state: Arc<Mutex<CacheState>>,
    events: broadcast::Sender<CacheEvent>,
    retry: RetryPolicy,
    limits: CacheLimits,
}

impl QueryCache {
    pub fn new(retry: RetryPolicy, limits: CacheLimits) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(CacheState::default())),
            events,
            retry,
            limits,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached value for `key`, if present, fresh and of type `T`.
    pub fn get<T>(&self, key: &QueryKey) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let value = self.lock().fresh(key, self.limits.stale_after)?;
        value.downcast::<T>().ok()
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.lock().fresh(key, self.limits.stale_after).is_some()
    }

    /// Returns the cached value for `key` or runs `fetcher`, retrying
    /// transient failures, and caches the result.
    ///
    /// A result whose fetch started before an invalidation of its entity is
    /// not stored; the fetch runs again so callers never see data older than
    /// the latest confirmed mutation.
    pub async fn fetch<T, E, F, Fut>(&self, key: QueryKey, mut fetcher: F) -> Result<Arc<T>, E>
    where
        T: Send + Sync + 'static,
        E: TransientError + Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(&key) {
            return Ok(hit);
        }

        let mut superseded = 0;
        loop {
            let generation = self.lock().generation(&key);
            let value = Arc::new(self.fetch_with_retry(&key, &mut fetcher).await?);

            if self.store_if_current(&key, generation, value.clone()) {
                return Ok(value);
            }

            superseded += 1;
            if superseded > self.retry.attempts {
                log::warn!("Query {key} keeps being invalidated, returning uncached result");
                return Ok(value);
            }
            log::debug!("Query {key} was invalidated while in flight, fetching again");
        }
    }

    async fn fetch_with_retry<T, E, F, Fut>(&self, key: &QueryKey, fetcher: &mut F) -> Result<T, E>
    where
        E: TransientError + Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;
        loop {
            match fetcher().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.retry.attempts => {
                    attempt += 1;
                    log::warn!(
                        "Query {key} failed ({attempt}/{}), retrying: {err}",
                        self.retry.attempts
                    );
                    tokio::time::sleep(self.retry.backoff * attempt).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn store_if_current(&self, key: &QueryKey, generation: u64, value: CachedValue) -> bool {
        {
            let mut state = self.lock();
            if state.generation(key) != generation {
                return false;
            }
            state.make_room(key, self.limits);
            state.entries.insert(
                key.clone(),
                Entry {
                    value,
                    stored_at: Instant::now(),
                },
            );
        }
        let _ = self.events.send(CacheEvent::Stored(key.clone()));
        true
    }

    /// Evicts every key of `kind` and of the kinds embedding it. Returns the
    /// number of evicted entries.
    pub fn invalidate_entity(&self, kind: EntityKind) -> usize {
        std::iter::once(kind)
            .chain(kind.dependents().iter().copied())
            .map(|kind| self.invalidate_name(kind.name()))
            .sum()
    }

    /// Evicts every key whose first element equals `name`.
    pub fn invalidate_name(&self, name: &str) -> usize {
        let evicted: Vec<QueryKey> = {
            let mut state = self.lock();
            *state.generations.entry(name.to_string()).or_insert(0) += 1;
            let keys: Vec<QueryKey> = state
                .entries
                .keys()
                .filter(|key| key.entity_name() == Some(name))
                .cloned()
                .collect();
            for key in &keys {
                state.entries.remove(key);
            }
            keys
        };

        log::debug!("Invalidated {} cached queries of {name}", evicted.len());
        let count = evicted.len();
        for key in evicted {
            let _ = self.events.send(CacheEvent::Invalidated(key));
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use thiserror::Error;

    use super::*;

    #[derive(Debug, Error)]
    enum TestError {
        #[error("connection reset")]
        Transient,
        #[error("bad request")]
        Fatal,
    }

    impl TransientError for TestError {
        fn is_transient(&self) -> bool {
            matches!(self, TestError::Transient)
        }
    }

    fn retry() -> RetryPolicy {
        RetryPolicy {
            attempts: 2,
            backoff: Duration::from_millis(1),
        }
    }

    fn cache() -> QueryCache {
        QueryCache::new(retry(), CacheLimits::default())
    }

    fn orders_page(index: usize) -> QueryKey {
        QueryKey::entity(EntityKind::Order)
            .with("page")
            .with(index)
    }

    async fn counted_fetch(
        cache: &QueryCache,
        key: QueryKey,
        calls: &AtomicUsize,
    ) -> Result<Arc<usize>, TestError> {
        cache
            .fetch(key, || async { Ok(calls.fetch_add(1, Ordering::SeqCst)) })
            .await
    }

    #[tokio::test]
    async fn repeated_reads_hit_the_cache() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        counted_fetch(&cache, orders_page(0), &calls).await.unwrap();
        counted_fetch(&cache, orders_page(0), &calls).await.unwrap();
        counted_fetch(&cache, orders_page(1), &calls).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidation_forces_a_refetch() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        counted_fetch(&cache, orders_page(0), &calls).await.unwrap();
        assert_eq!(cache.invalidate_entity(EntityKind::Order), 1);
        let value = counted_fetch(&cache, orders_page(0), &calls).await.unwrap();

        assert_eq!(*value, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidation_only_touches_the_entity_and_its_dependents() {
        let cache = cache();
        let calls = AtomicUsize::new(0);
        let collections = QueryKey::entity(EntityKind::Collection).with("page").with(0usize);
        let suppliers = QueryKey::entity(EntityKind::Supplier).with("options");

        counted_fetch(&cache, orders_page(0), &calls).await.unwrap();
        counted_fetch(&cache, collections.clone(), &calls).await.unwrap();
        counted_fetch(&cache, suppliers.clone(), &calls).await.unwrap();

        cache.invalidate_entity(EntityKind::Customer);

        assert!(!cache.contains(&orders_page(0)));
        assert!(cache.contains(&collections));
        assert!(cache.contains(&suppliers));
    }

    #[tokio::test]
    async fn subscribers_see_stores_and_evictions() {
        let cache = cache();
        let mut events = cache.subscribe();
        let calls = AtomicUsize::new(0);

        counted_fetch(&cache, orders_page(0), &calls).await.unwrap();
        cache.invalidate_name("orders");

        assert_eq!(
            events.recv().await.unwrap(),
            CacheEvent::Stored(orders_page(0))
        );
        assert_eq!(
            events.recv().await.unwrap(),
            CacheEvent::Invalidated(orders_page(0))
        );
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        let value = cache
            .fetch(orders_page(0), || async {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 | 1 => Err(TestError::Transient),
                    n => Ok(n),
                }
            })
            .await
            .unwrap();

        assert_eq!(*value, 2);
    }

    #[tokio::test]
    async fn retries_are_bounded() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        let result: Result<Arc<usize>, TestError> = cache
            .fetch(orders_page(0), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Transient)
            })
            .await;

        assert!(matches!(result, Err(TestError::Transient)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(!cache.contains(&orders_page(0)));
    }

    #[tokio::test]
    async fn fatal_failures_are_not_retried() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        let result: Result<Arc<usize>, TestError> = cache
            .fetch(orders_page(0), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Fatal)
            })
            .await;

        assert!(matches!(result, Err(TestError::Fatal)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn results_superseded_by_an_invalidation_are_refetched() {
        let cache = cache();
        let calls = AtomicUsize::new(0);
        let mutating = cache.clone();

        let value = cache
            .fetch(orders_page(0), || {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                if call == 0 {
                    // A mutation lands while the first request is in flight.
                    mutating.invalidate_entity(EntityKind::Order);
                }
                async move { Ok::<_, TestError>(call) }
            })
            .await
            .unwrap();

        assert_eq!(*value, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.get::<usize>(&orders_page(0)).as_deref(), Some(&1));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_entries_are_refetched() {
        let cache = QueryCache::new(
            retry(),
            CacheLimits {
                stale_after: Duration::from_secs(30),
                max_entries: 10,
            },
        );
        let calls = AtomicUsize::new(0);

        counted_fetch(&cache, orders_page(0), &calls).await.unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;
        counted_fetch(&cache, orders_page(0), &calls).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(25)).await;
        assert!(!cache.contains(&orders_page(0)));
        let value = counted_fetch(&cache, orders_page(0), &calls).await.unwrap();

        assert_eq!(*value, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn full_cache_drops_the_oldest_entry() {
        let cache = QueryCache::new(
            retry(),
            CacheLimits {
                stale_after: Duration::from_secs(30),
                max_entries: 2,
            },
        );
        let calls = AtomicUsize::new(0);

        for index in 0..3 {
            counted_fetch(&cache, orders_page(index), &calls).await.unwrap();
            tokio::time::advance(Duration::from_millis(1)).await;
        }

        assert_eq!(cache.lock().entries.len(), 2);
        assert!(!cache.contains(&orders_page(0)));
        assert!(cache.contains(&orders_page(1)));
        assert!(cache.contains(&orders_page(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entries_make_room_first() {
        let cache = QueryCache::new(
            retry(),
            CacheLimits {
                stale_after: Duration::from_secs(5),
                max_entries: 3,
            },
        );
        let calls = AtomicUsize::new(0);

        counted_fetch(&cache, orders_page(0), &calls).await.unwrap();
        counted_fetch(&cache, orders_page(1), &calls).await.unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;
        counted_fetch(&cache, orders_page(2), &calls).await.unwrap();

        assert_eq!(cache.lock().entries.len(), 1);
    }
}
