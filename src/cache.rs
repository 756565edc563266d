/*!
 * Query result caching functionality.
 *
 * This module memoizes the two backend read calls with a fixed time-to-live,
 * keyed by the exact argument tuple. A valid entry short-circuits the
 * upstream call entirely and returns a clone of the stored value; an absent
 * or expired entry triggers exactly one fresh call, guarded by a per-key
 * lock so simultaneous cold lookups cannot stampede the backend.
 *
 * The cache is process-wide by default: keys carry no session identity, so
 * results fetched under an earlier sign-in remain valid for later sessions
 * until they expire. `CachedBackend::with_scope` keys entries by a digest of
 * the acting token instead, which makes every sign-in start cold.
 */

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crate::backend::QueryBackend;
use crate::errors::QueryError;
use crate::model::{Entry, FilterSpec, Table};

/// Cache key derived deterministically from a read call's argument tuple
///
/// Two calls with structurally equal inputs produce equal keys regardless of
/// call order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Identity scope, when the cache is keyed per token
    scope: Option<String>,

    /// Backend table name
    table: &'static str,

    /// Canonical serialization of the operation and its arguments
    request: String,
}

impl CacheKey {
    /// Key for a `list_distinct_values(table, column)` call
    pub fn distinct_values(scope: Option<&str>, table: Table, column: &str) -> Self {
        Self {
            scope: scope.map(|s| s.to_string()),
            table: table.as_str(),
            request: format!("distinct:{}", column),
        }
    }

    /// Key for a `query_entries(table, filter)` call
    pub fn entries(scope: Option<&str>, table: Table, filter: &FilterSpec) -> Self {
        // Struct field order makes the JSON serialization canonical.
        let serialized = serde_json::to_string(filter).unwrap_or_else(|_| format!("{}", filter));
        Self {
            scope: scope.map(|s| s.to_string()),
            table: table.as_str(),
            request: format!("entries:{}", serialized),
        }
    }
}

/// A stored value and its creation time
#[derive(Debug)]
struct StoredValue<V> {
    value: V,
    stored_at: Instant,
}

type Slot<V> = Arc<tokio::sync::Mutex<Option<StoredValue<V>>>>;

/// Hit/miss counters for instrumentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Lookups served from a valid entry
    pub hits: usize,
    /// Lookups that went upstream
    pub misses: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Time-based cache over one value type
pub struct TtlCache<V> {
    /// Internal cache storage: one guarded slot per key
    slots: Mutex<HashMap<CacheKey, Slot<V>>>,

    /// Validity window for stored values
    ttl: Duration,

    /// Cache hit counter
    hits: AtomicUsize,

    /// Cache miss counter
    misses: AtomicUsize,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache whose entries are valid for `ttl` from creation
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            ttl,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Return the cached value for `key`, or populate it with `fetch`
    ///
    /// The check-then-populate sequence holds a per-key lock, so concurrent
    /// cold lookups of the same key perform a single upstream call and the
    /// rest observe the stored result. Different keys never contend. Errors
    /// are not cached: a failed populate leaves the slot empty and the error
    /// propagates to the caller.
    pub async fn get_or_populate<F, Fut>(&self, key: CacheKey, fetch: F) -> Result<V, QueryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, QueryError>>,
    {
        let slot = {
            let mut slots = self.slots.lock();
            slots.entry(key.clone()).or_default().clone()
        };

        let mut guard = slot.lock().await;

        if let Some(stored) = guard.as_ref() {
            if stored.stored_at.elapsed() < self.ttl {
                self.hits.fetch_add(1, Ordering::SeqCst);
                debug!("Cache hit for {}/{}", key.table, key.request);
                return Ok(stored.value.clone());
            }
        }

        self.misses.fetch_add(1, Ordering::SeqCst);
        debug!("Cache miss for {}/{}", key.table, key.request);

        let value = fetch().await?;
        *guard = Some(StoredValue {
            value: value.clone(),
            stored_at: Instant::now(),
        });

        Ok(value)
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::SeqCst),
            misses: self.misses.load(Ordering::SeqCst),
        }
    }

    /// Drop every stored value and reset the counters
    pub fn clear(&self) {
        self.slots.lock().clear();
        self.hits.store(0, Ordering::SeqCst);
        self.misses.store(0, Ordering::SeqCst);
        debug!("Query cache cleared");
    }

    /// Number of keys with a slot (populated or in flight)
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}

impl<V> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish_non_exhaustive()
    }
}

/// Process-wide storage for both read-call caches
///
/// Owned above the per-token client so stored results survive sign-out and
/// sign-in: by default a later session is served values fetched under an
/// earlier one until they expire. Key entries per token (see
/// `CachedBackend::with_scope`) to close that window.
#[derive(Debug)]
pub struct QueryCaches {
    /// Cache for distinct-value lists
    values: TtlCache<Vec<String>>,

    /// Cache for entry query results
    entries: TtlCache<Vec<Entry>>,
}

impl QueryCaches {
    /// Create both caches with one validity window
    pub fn new(ttl: Duration) -> Self {
        Self {
            values: TtlCache::new(ttl),
            entries: TtlCache::new(ttl),
        }
    }

    /// Combined hit/miss statistics across both caches
    pub fn stats(&self) -> CacheStats {
        let values = self.values.stats();
        let entries = self.entries.stats();
        CacheStats {
            hits: values.hits + entries.hits,
            misses: values.misses + entries.misses,
        }
    }

    /// Drop every cached result
    pub fn clear(&self) {
        self.values.clear();
        self.entries.clear();
    }
}

/// A query backend wrapped with TTL memoization of both read calls
#[derive(Debug)]
pub struct CachedBackend<B> {
    /// The wire client calls fall through to
    inner: Arc<B>,

    /// Shared cache storage, outliving this wrapper
    caches: Arc<QueryCaches>,

    /// Identity scope applied to every key, when enabled
    scope: Option<String>,
}

impl<B: QueryBackend> CachedBackend<B> {
    /// Wrap `inner` over the shared `caches`, unscoped
    pub fn new(inner: B, caches: Arc<QueryCaches>) -> Self {
        Self {
            inner: Arc::new(inner),
            caches,
            scope: None,
        }
    }

    /// Wrap `inner` over the shared `caches`, keyed by a digest of `token`
    pub fn with_scope(inner: B, caches: Arc<QueryCaches>, token: &str) -> Self {
        let mut cached = Self::new(inner, caches);
        cached.scope = Some(token_digest(token));
        cached
    }

    /// The wrapped backend
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Cached distinct values of `column` in `table`
    pub async fn list_distinct_values(&self, table: Table, column: &str) -> Result<Vec<String>, QueryError> {
        let key = CacheKey::distinct_values(self.scope.as_deref(), table, column);
        let inner = Arc::clone(&self.inner);
        let column = column.to_string();
        self.caches
            .values
            .get_or_populate(key, move || async move {
                inner.list_distinct_values(table, &column).await
            })
            .await
    }

    /// Cached entry query against `table`
    pub async fn query_entries(&self, table: Table, filter: &FilterSpec) -> Result<Vec<Entry>, QueryError> {
        let key = CacheKey::entries(self.scope.as_deref(), table, filter);
        let inner = Arc::clone(&self.inner);
        let filter = filter.clone();
        self.caches
            .entries
            .get_or_populate(key, move || async move {
                inner.query_entries(table, &filter).await
            })
            .await
    }

    /// Combined hit/miss statistics of the shared caches
    pub fn stats(&self) -> CacheStats {
        self.caches.stats()
    }
}

/// Hex digest used to scope keys without holding the raw token
fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
