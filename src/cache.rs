//! Memoizing request cache with a TTL and a bounded size.
//!
//! Wraps an async fetch function. A successful fetch is stored under its key
//! with the time it completed; a later [`RequestCache::get`] for that key
//! returns the stored value until it is `ttl` old. Failed fetches are never
//! stored, so the next call retries.
//!
//! Concurrent calls for the same key are not coalesced: each misses and
//! issues its own fetch, and the last one to complete wins the slot.

use crate::config::CacheConfig;
use crate::error::ValidationError;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

type FetchFn<A, V, E> = Arc<dyn Fn(String, A) -> BoxFuture<'static, Result<V, E>> + Send + Sync>;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted: Instant,
    /// Insertion order; timestamps can tie.
    seq: u64,
}

/// Async memoizing cache keyed by string.
///
/// `A` is the extra argument handed to the fetch function on a miss, `V` the
/// cached value and `E` the fetch error.
pub struct RequestCache<A, V, E> {
    ttl: Duration,
    max_size: usize,
    fetch: FetchFn<A, V, E>,
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    next_seq: AtomicU64,
}

impl<A, V, E> std::fmt::Debug for RequestCache<A, V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestCache")
            .field("ttl", &self.ttl)
            .field("max_size", &self.max_size)
            .field("len", &self.entries.lock().len())
            .finish()
    }
}

impl<A, V, E> RequestCache<A, V, E>
where
    A: Send + 'static,
    V: Clone + Send + 'static,
    E: Send + 'static,
{
    /// Build a cache, validating `ttl` and `max_size`.
    pub fn new<F, Fut>(ttl: Duration, max_size: usize, fetch: F) -> Result<Self, ValidationError>
    where
        F: Fn(String, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        RequestCacheBuilder::new()
            .ttl(ttl)
            .max_size(max_size)
            .fetch(fetch)
            .build()
    }

    /// Start a builder.
    pub fn builder() -> RequestCacheBuilder<A, V, E> {
        RequestCacheBuilder::new()
    }

    /// Return the cached value for `key`, fetching it on a miss.
    pub async fn get(&self, key: &str, args: A) -> Result<V, E> {
        {
            let mut entries = self.entries.lock();
            if let Some(entry) = entries.get(key) {
                if entry.inserted.elapsed() < self.ttl {
                    crate::metrics::record_cache("hit");
                    return Ok(entry.value.clone());
                }
                entries.remove(key);
            }
        }

        crate::metrics::record_cache("miss");
        let value = match (self.fetch)(key.to_string(), args).await {
            Ok(value) => value,
            Err(e) => {
                crate::metrics::record_cache("error");
                return Err(e);
            }
        };

        let mut entries = self.entries.lock();
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.clone(),
                inserted: Instant::now(),
                seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            },
        );
        if entries.len() > self.max_size {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.seq)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                trace!(key = %oldest, "evicting oldest cache entry");
                entries.remove(&oldest);
            }
        }

        Ok(value)
    }

    /// Drop the entry for `key`, if any.
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

/// Builder for [`RequestCache`]; validation happens in [`build`](Self::build).
pub struct RequestCacheBuilder<A, V, E> {
    ttl: Duration,
    max_size: usize,
    fetch: Option<FetchFn<A, V, E>>,
}

impl<A, V, E> Default for RequestCacheBuilder<A, V, E>
where
    A: Send + 'static,
    V: Clone + Send + 'static,
    E: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A, V, E> RequestCacheBuilder<A, V, E>
where
    A: Send + 'static,
    V: Clone + Send + 'static,
    E: Send + 'static,
{
    /// Start from the configuration defaults, with no fetch function.
    pub fn new() -> Self {
        Self::from_config(&CacheConfig::default())
    }

    /// Start from a [`CacheConfig`].
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            ttl: config.ttl(),
            max_size: config.max_size,
            fetch: None,
        }
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the function called on a miss with the key and the call's args.
    pub fn fetch<F, Fut>(mut self, fetch: F) -> Self
    where
        F: Fn(String, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        self.fetch = Some(Arc::new(move |key, args| fetch(key, args).boxed()));
        self
    }

    /// Validate and build the cache.
    pub fn build(self) -> Result<RequestCache<A, V, E>, ValidationError> {
        if self.ttl.is_zero() {
            return Err(ValidationError::ZeroTtl);
        }
        if self.max_size == 0 {
            return Err(ValidationError::ZeroMaxSize);
        }
        let fetch = self.fetch.ok_or(ValidationError::MissingFetch)?;
        Ok(RequestCache {
            ttl: self.ttl,
            max_size: self.max_size,
            fetch,
            entries: Mutex::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
        })
    }
}
