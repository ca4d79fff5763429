//! Bounded, single-flight memoization of station fetches.
//!
//! `KeyedMemoizer` maps a [`CacheKey`] to the last successful result computed
//! for it.
//!
//! ## Eviction Strategy
//! - Entry-count LRU: a hit bumps recency, an insert at capacity drops the
//!   least recently used entry
//! - Optional TTL-based expiration on read (lazy)
//!
//! ## Failures
//! Errors, `None` and empty results are handed back to the caller but never
//! stored, so a transient upstream failure cannot poison later lookups.
//!
//! ## Concurrency
//! Concurrent misses on the same key share one in-flight computation. The
//! computation runs on its own tokio task, stores its own result and releases
//! its in-flight slot when it finishes, so dropping any caller (the one that
//! started it included) never stalls the key or the memoizer.

use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use lru::LruCache;
use marine_common::{FetchResult, MarineError, MarineResult};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::key::CacheKey;

/// Default maximum number of resident entries.
pub const DEFAULT_CAPACITY: usize = 128;

/// Values a memoizer can hold.
pub trait CacheValue: Clone + Send + Sync + 'static {
    /// Empty values are returned to the caller but never stored.
    fn is_empty(&self) -> bool;
}

impl CacheValue for FetchResult {
    fn is_empty(&self) -> bool {
        FetchResult::is_empty(self)
    }
}

impl<T: Clone + Send + Sync + 'static> CacheValue for Vec<T> {
    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}

impl CacheValue for String {
    fn is_empty(&self) -> bool {
        String::is_empty(self)
    }
}

type Flight<V> = Shared<BoxFuture<'static, MarineResult<Option<V>>>>;

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Statistics for a memoizer.
#[derive(Default)]
pub struct MemoizerStats {
    /// Lookups answered from a resident entry.
    pub hits: AtomicU64,
    /// Lookups that started a new computation.
    pub misses: AtomicU64,
    /// Lookups that joined a computation already in flight.
    pub coalesced: AtomicU64,
    /// Results stored.
    pub stores: AtomicU64,
    /// Computations that produced nothing worth storing.
    pub empty_results: AtomicU64,
    /// Computations that returned an error.
    pub failures: AtomicU64,
    /// Entries dropped to make room.
    pub evictions: AtomicU64,
    /// Entries dropped because their TTL had passed.
    pub expired: AtomicU64,
    /// Current number of entries.
    pub entry_count: AtomicU64,
}

impl MemoizerStats {
    /// Cache hit rate as a percentage (0-100). Coalesced lookups count as misses.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let total = hits
            + self.misses.load(Ordering::Relaxed)
            + self.coalesced.load(Ordering::Relaxed);
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            empty_results: self.empty_results.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            entry_count: self.entry_count.load(Ordering::Relaxed),
            hit_rate: self.hit_rate(),
        }
    }
}

/// Point-in-time copy of [`MemoizerStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub coalesced: u64,
    pub stores: u64,
    pub empty_results: u64,
    pub failures: u64,
    pub evictions: u64,
    pub expired: u64,
    pub entry_count: u64,
    pub hit_rate: f64,
}

struct Inner<V> {
    name: String,
    entries: Mutex<LruCache<CacheKey, CacheEntry<V>>>,
    in_flight: Mutex<HashMap<CacheKey, Flight<V>>>,
    capacity: NonZeroUsize,
    ttl: Option<Duration>,
    stats: MemoizerStats,
}

impl<V: CacheValue> Inner<V> {
    fn is_expired(&self, entry: &CacheEntry<V>) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.inserted_at.elapsed() >= ttl)
    }

    /// Return a live resident value, bumping its recency.
    async fn lookup(&self, key: &CacheKey) -> Option<V> {
        let mut entries = self.entries.lock().await;

        match entries.get(key) {
            None => return None,
            Some(entry) if !self.is_expired(entry) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
            Some(_) => {}
        }

        entries.pop(key);
        self.stats.expired.fetch_add(1, Ordering::Relaxed);
        self.stats
            .entry_count
            .store(entries.len() as u64, Ordering::Relaxed);
        tracing::debug!("{} entry {} expired", self.name, key);
        None
    }

    async fn store(&self, key: CacheKey, value: V) {
        let mut entries = self.entries.lock().await;
        let entry = CacheEntry {
            value,
            inserted_at: Instant::now(),
        };

        // push hands back either the replaced entry for this key or the LRU victim
        if let Some((evicted, _)) = entries.push(key.clone(), entry) {
            if evicted != key {
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    "{} evicted least recently used entry {} to store {}",
                    self.name,
                    evicted,
                    key
                );
            }
        }

        self.stats.stores.fetch_add(1, Ordering::Relaxed);
        self.stats
            .entry_count
            .store(entries.len() as u64, Ordering::Relaxed);
    }

    /// Run `fetch` on its own task and return a handle every waiter can share.
    ///
    /// The task owns the store and the slot release, so both happen exactly
    /// once whether or not anyone is still awaiting the flight.
    fn launch<Fut>(inner: Arc<Self>, key: CacheKey, fetch: Fut) -> Flight<V>
    where
        Fut: Future<Output = MarineResult<Option<V>>> + Send + 'static,
    {
        let task = tokio::spawn({
            let inner = Arc::clone(&inner);
            let key = key.clone();
            async move {
                let result = fetch.await;

                // Store before releasing the slot so no caller can miss both.
                let mut flights = inner.in_flight.lock().await;
                match &result {
                    Ok(Some(value)) if !value.is_empty() => {
                        inner.store(key.clone(), value.clone()).await;
                    }
                    Ok(_) => {
                        inner.stats.empty_results.fetch_add(1, Ordering::Relaxed);
                        tracing::debug!("{} not caching empty result for {}", inner.name, key);
                    }
                    Err(e) => {
                        inner.stats.failures.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!("{} fetch for {} failed: {}", inner.name, key, e);
                    }
                }
                flights.remove(&key);

                result
            }
        });

        async move {
            match task.await {
                Ok(result) => result,
                Err(e) => {
                    // The task died before releasing its slot.
                    inner.in_flight.lock().await.remove(&key);
                    inner.stats.failures.fetch_add(1, Ordering::Relaxed);
                    tracing::error!("{} fetch task for {} aborted: {}", inner.name, key, e);
                    Err(MarineError::Internal(format!("fetch task for {} failed: {}", key, e)))
                }
            }
        }
        .boxed()
        .shared()
    }
}

/// Bounded LRU memoizer with per-key single-flight.
pub struct KeyedMemoizer<V = FetchResult> {
    inner: Arc<Inner<V>>,
}

impl<V: CacheValue> KeyedMemoizer<V> {
    /// Create a memoizer holding at most `capacity` entries.
    ///
    /// # Arguments
    /// * `name` - Label used in logs and metrics
    /// * `capacity` - Maximum resident entries; 0 is raised to 1
    /// * `ttl` - Optional time-to-live; `None` keeps entries until evicted
    pub fn new(name: impl Into<String>, capacity: usize, ttl: Option<Duration>) -> Self {
        let name = name.into();
        let capacity = NonZeroUsize::new(capacity).unwrap_or_else(|| {
            tracing::warn!("{} capacity of 0 requested, using 1", name);
            NonZeroUsize::MIN
        });

        tracing::info!(
            "{} initialized: capacity={}, ttl_secs={:?}",
            name,
            capacity,
            ttl.map(|t| t.as_secs())
        );

        Self {
            inner: Arc::new(Inner {
                name,
                entries: Mutex::new(LruCache::new(capacity)),
                in_flight: Mutex::new(HashMap::new()),
                capacity,
                ttl,
                stats: MemoizerStats::default(),
            }),
        }
    }

    /// Return the value stored for `key`, computing it on a miss.
    ///
    /// On a hit the entry becomes most recently used and `compute` is not
    /// called. On a miss `compute` is called at most once across all
    /// concurrent callers for `key`; a non-empty result is stored, anything
    /// else is returned as-is without being stored.
    pub async fn get_or_compute<F, Fut>(&self, key: CacheKey, compute: F) -> MarineResult<Option<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = MarineResult<Option<V>>> + Send + 'static,
    {
        if let Some(value) = self.inner.lookup(&key).await {
            return Ok(Some(value));
        }

        let flight = {
            let mut flights = self.inner.in_flight.lock().await;

            // A flight may have stored its value since the lookup above.
            if let Some(value) = self.inner.lookup(&key).await {
                return Ok(Some(value));
            }

            match flights.get(&key) {
                Some(flight) => {
                    self.inner.stats.coalesced.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!("{} joining in-flight fetch for {}", self.inner.name, key);
                    flight.clone()
                }
                None => {
                    self.inner.stats.misses.fetch_add(1, Ordering::Relaxed);
                    let flight = Inner::launch(Arc::clone(&self.inner), key.clone(), compute());
                    flights.insert(key, flight.clone());
                    flight
                }
            }
        };

        flight.await
    }

    /// Check residency without touching recency.
    pub async fn contains(&self, key: &CacheKey) -> bool {
        let entries = self.inner.entries.lock().await;
        entries
            .peek(key)
            .is_some_and(|entry| !self.inner.is_expired(entry))
    }

    pub async fn len(&self) -> usize {
        self.inner.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.entries.lock().await.is_empty()
    }

    /// Number of computations currently running.
    pub async fn in_flight(&self) -> usize {
        self.inner.in_flight.lock().await.len()
    }

    /// Drop every resident entry. Computations in flight are unaffected.
    pub async fn clear(&self) {
        let mut entries = self.inner.entries.lock().await;
        let count = entries.len();
        entries.clear();
        self.inner.stats.entry_count.store(0, Ordering::Relaxed);
        tracing::info!("{} cleared {} entries", self.inner.name, count);
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity.get()
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.inner.ttl
    }

    pub fn stats(&self) -> &MemoizerStats {
        &self.inner.stats
    }
}
