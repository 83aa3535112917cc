//! Conversion cache.
//!
//! Maps a [`TypePair`] to the conversion function discovered for it. Entries
//! are inserted once and never evicted; a pair with no mechanism is never
//! stored, so every lookup for it re-runs discovery.
//!
//! Readers never observe a partially built function: entries are inserted
//! whole, and when two threads discover the same pair concurrently the first
//! insert wins and both callers get the stored function back.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;

use morph_core::{ConversionContext, InvalidValue, TypePair, Value};

/// A resolved conversion between two types.
///
/// Stateless and shareable across threads. Failures are always value-level:
/// the types were already found convertible when the function was built.
pub type ConversionFn =
    Arc<dyn Fn(&ConversionContext<'_>, Value) -> Result<Value, InvalidValue> + Send + Sync>;

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that fell through to discovery.
    pub misses: u64,
}

/// Concurrent, grow-only map from type pair to conversion function.
#[derive(Default)]
pub struct ConversionCache {
    entries: DashMap<TypePair, ConversionFn, FxBuildHasher>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ConversionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the function for `pair`, counting a hit or a miss.
    pub fn get(&self, pair: &TypePair) -> Option<ConversionFn> {
        match self.entries.get(pair) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(entry.value()))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert `func` unless `pair` already has an entry; return the stored one.
    pub fn get_or_insert(&self, pair: TypePair, func: ConversionFn) -> ConversionFn {
        Arc::clone(self.entries.entry(pair).or_insert(func).value())
    }

    /// Check for an entry without touching the counters.
    pub fn contains(&self, pair: &TypePair) -> bool {
        self.entries.contains_key(pair)
    }

    /// Number of cached pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl fmt::Debug for ConversionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionCache")
            .field("len", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morph_core::{DataType, TypeHash, primitives};
    use std::thread;

    fn pair(source: TypeHash, target: TypeHash) -> TypePair {
        TypePair::new(&DataType::named(source), &DataType::named(target))
    }

    fn constant(value: i32) -> ConversionFn {
        Arc::new(move |_ctx: &ConversionContext<'_>, _value: Value| Ok(Value::Int32(value)))
    }

    #[test]
    fn miss_then_hit() {
        let cache = ConversionCache::new();
        let key = pair(primitives::STRING, primitives::INT32);

        assert!(cache.get(&key).is_none());
        cache.get_or_insert(key, constant(1));
        assert!(cache.get(&key).is_some());

        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn first_insert_wins() {
        let cache = ConversionCache::new();
        let key = pair(primitives::STRING, primitives::INT32);

        let first = cache.get_or_insert(key, constant(1));
        let second = cache.get_or_insert(key, constant(2));
        assert!(Arc::ptr_eq(&first, &second));

        let ctx = ConversionContext::empty();
        assert_eq!(second(&ctx, Value::Null).unwrap(), Value::Int32(1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn contains_does_not_count() {
        let cache = ConversionCache::new();
        let key = pair(primitives::BOOL, primitives::STRING);
        assert!(!cache.contains(&key));
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn concurrent_inserts_converge() {
        let cache = Arc::new(ConversionCache::new());
        let key = pair(primitives::STRING, primitives::DOUBLE);

        let stored: Vec<ConversionFn> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.get_or_insert(key, constant(i)))
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        assert_eq!(cache.len(), 1);
        assert!(stored.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
