//! Memoization of query-layer results.
//!
//! [`QueryCache`] is a bounded table keyed by a string built from the query name and every
//! argument that affects the result. When the table is full the oldest inserted key is evicted
//! (FIFO, not LRU) in constant time. Every document mutation clears the table before the reduced
//! model is touched, so a hit can never observe a stale lexical structure.
//!
//! The table has its own lock, independent of the reduced-model lock: lookups and stores never
//! wait on a query in progress and vice versa.

use crate::error::CacheError;
use crate::highlight::HighlightStatus;
use crate::reduced::IndentInfo;
use crate::token::ReducedModelState;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Default number of entries kept before FIFO eviction starts.
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// A memoized query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedValue {
    /// An offset, or `None` for "not found".
    Pos(Option<usize>),
    /// A plain offset.
    Offset(usize),
    /// A yes/no answer.
    Flag(bool),
    /// A lexical state.
    State(ReducedModelState),
    /// A text fragment (e.g. leading whitespace).
    Text(String),
    /// Brace nesting facts.
    Indent(IndentInfo),
    /// Highlight spans.
    Spans(Vec<HighlightStatus>),
}

/// Conversion between query result types and [`CachedValue`].
pub trait Memo: Sized {
    /// Wrap a result for storage.
    fn into_cached(self) -> CachedValue;
    /// Unwrap a stored result, if it has the expected shape.
    fn from_cached(value: CachedValue) -> Option<Self>;
}

macro_rules! impl_memo {
    ($ty:ty, $variant:ident) => {
        impl Memo for $ty {
            fn into_cached(self) -> CachedValue {
                CachedValue::$variant(self)
            }

            fn from_cached(value: CachedValue) -> Option<Self> {
                match value {
                    CachedValue::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

impl_memo!(Option<usize>, Pos);
impl_memo!(usize, Offset);
impl_memo!(bool, Flag);
impl_memo!(ReducedModelState, State);
impl_memo!(String, Text);
impl_memo!(IndentInfo, Indent);
impl_memo!(Vec<HighlightStatus>, Spans);

/// Hit/miss/clear counters, for instrumentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Lookups answered from the table.
    pub hits: u64,
    /// Lookups that had to be computed.
    pub misses: u64,
    /// Clears that actually emptied a non-empty table.
    pub clears: u64,
}

/// Entries plus their insertion order. Both always hold the same key set.
#[derive(Debug)]
struct CacheTable {
    entries: IndexMap<String, CachedValue>,
    order: VecDeque<String>,
    capacity: usize,
}

impl CacheTable {
    /// Insert or overwrite `key`, evicting the oldest key first when a new key finds the table
    /// full. Returns the evicted key.
    fn insert(&mut self, key: String, value: CachedValue) -> Option<String> {
        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = value;
            return None;
        }
        let evicted = if self.entries.len() >= self.capacity {
            self.order.pop_front().inspect(|oldest| {
                self.entries.swap_remove(oldest);
            })
        } else {
            None
        };
        self.order.push_back(key.clone());
        self.entries.insert(key, value);
        evicted
    }

    fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        self.order.clear();
        dropped
    }
}

/// FIFO-bounded memo table with its own lock.
#[derive(Debug)]
pub struct QueryCache {
    table: Mutex<CacheTable>,
    in_use: AtomicBool,
    enabled: AtomicBool,
    hits: AtomicU64,
    misses: AtomicU64,
    clears: AtomicU64,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl QueryCache {
    /// Create a cache holding at most `capacity` entries. A capacity of 0 disables storage.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: Mutex::new(CacheTable {
                entries: IndexMap::new(),
                order: VecDeque::new(),
                capacity,
            }),
            in_use: AtomicBool::new(false),
            enabled: AtomicBool::new(true),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            clears: AtomicU64::new(0),
        }
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.table.lock().capacity
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.table.lock().entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if lookups and stores are active.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Turn memoization on or off. Disabling also empties the table.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
        if !enabled {
            self.clear();
        }
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
        }
    }

    /// Look up `key`.
    pub fn check(&self, key: &str) -> Option<CachedValue> {
        if !self.is_enabled() {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }
        let found = self.table.lock().entries.get(key).cloned();
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Insert or overwrite `key`. A new key evicts the oldest entry when the table is full.
    pub fn store(&self, key: String, value: CachedValue) -> Result<(), CacheError> {
        if !self.is_enabled() {
            return Ok(());
        }
        let mut table = self.table.lock();
        if table.capacity == 0 {
            return Ok(());
        }
        if let Some(evicted) = table.insert(key, value) {
            log::trace!("query cache evicted {evicted}");
        }
        self.in_use.store(true, Ordering::Release);

        let len = table.entries.len();
        if len > table.capacity || len != table.order.len() {
            log::error!("query cache exceeded its bound: {len} > {}", table.capacity);
            return Err(CacheError::SizeInvariant {
                len,
                capacity: table.capacity,
            });
        }
        Ok(())
    }

    /// Empty the table. Does nothing unless something was stored since the last clear.
    pub fn clear(&self) {
        if !self.in_use.swap(false, Ordering::AcqRel) {
            return;
        }
        let dropped = self.table.lock().clear();
        self.clears.fetch_add(1, Ordering::Relaxed);
        log::debug!("query cache cleared ({dropped} entries)");
    }

    /// Return the cached result for `key`, or compute, store and return it.
    ///
    /// The table lock is not held while `compute` runs.
    pub fn memoize<T, E>(
        &self,
        key: impl FnOnce() -> String,
        compute: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E>
    where
        T: Memo + Clone,
        E: From<CacheError>,
    {
        if !self.is_enabled() {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return compute();
        }
        let key = key();
        if let Some(value) = self.check(&key).and_then(T::from_cached) {
            return Ok(value);
        }
        let value = compute()?;
        self.store(key, value.clone().into_cached())?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_check_and_store() {
        let cache = QueryCache::default();
        assert_eq!(cache.capacity(), DEFAULT_CACHE_CAPACITY);
        assert_eq!(cache.check("line_start:50"), None);
        cache
            .store("line_start:50".to_string(), CachedValue::Offset(40))
            .unwrap();
        assert_eq!(cache.check("line_start:50"), Some(CachedValue::Offset(40)));
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                clears: 0
            }
        );
    }

    #[test]
    fn test_fifo_eviction_drops_oldest_insert() {
        let cache = QueryCache::with_capacity(3);
        for (i, key) in ["a", "b", "c"].into_iter().enumerate() {
            cache.store(key.to_string(), CachedValue::Offset(i)).unwrap();
        }
        // Reading "a" does not protect it: eviction is by insertion order.
        assert!(cache.check("a").is_some());
        cache.store("d".to_string(), CachedValue::Offset(3)).unwrap();
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.check("a"), None);
        assert!(cache.check("b").is_some());
        assert!(cache.check("d").is_some());
    }

    #[test]
    fn test_evicted_key_is_stored_again_as_newest() {
        let cache = QueryCache::with_capacity(3);
        for i in 0..1_000 {
            cache
                .store(format!("k{}", i % 5), CachedValue::Offset(i))
                .unwrap();
        }
        // 995..1000 wrote k0..k4; the last three writes were k2, k3, k4.
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.check("k1"), None);
        assert_eq!(cache.check("k2"), Some(CachedValue::Offset(997)));
        assert_eq!(cache.check("k4"), Some(CachedValue::Offset(999)));

        cache.store("k0".to_string(), CachedValue::Offset(0)).unwrap();
        assert_eq!(cache.check("k2"), None);
        assert!(cache.check("k3").is_some());

        let table = cache.table.lock();
        assert_eq!(table.order, ["k3", "k4", "k0"]);
        assert_eq!(table.entries.len(), 3);
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let cache = QueryCache::with_capacity(2);
        cache.store("a".to_string(), CachedValue::Flag(true)).unwrap();
        cache.store("b".to_string(), CachedValue::Flag(true)).unwrap();
        cache.store("a".to_string(), CachedValue::Flag(false)).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.check("a"), Some(CachedValue::Flag(false)));
        assert!(cache.check("b").is_some());
    }

    #[test]
    fn test_clear_only_counts_when_in_use() {
        let cache = QueryCache::default();
        cache.clear();
        assert_eq!(cache.stats().clears, 0);

        cache.store("k".to_string(), CachedValue::Pos(None)).unwrap();
        cache.clear();
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().clears, 1);
    }

    #[test]
    fn test_memoize_computes_once() {
        let cache = QueryCache::default();
        let mut calls = 0;
        for _ in 0..3 {
            let value: Result<Option<usize>, CacheError> = cache.memoize(
                || "find:7".to_string(),
                || {
                    calls += 1;
                    Ok(Some(7))
                },
            );
            assert_eq!(value, Ok(Some(7)));
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let cache = QueryCache::default();
        cache.set_enabled(false);
        cache.store("k".to_string(), CachedValue::Flag(true)).unwrap();
        assert!(cache.is_empty());
        assert_eq!(cache.check("k"), None);
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let cache = QueryCache::with_capacity(0);
        cache.store("k".to_string(), CachedValue::Flag(true)).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_shape_mismatch_is_a_miss() {
        assert_eq!(bool::from_cached(CachedValue::Offset(1)), None);
        assert_eq!(
            String::from_cached(CachedValue::Text("  ".to_string())),
            Some("  ".to_string())
        );
    }
}
