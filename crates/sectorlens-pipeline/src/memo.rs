//! Bounded memoization cache for pure query results.
//!
//! Entries are never invalidated when the store changes; a cached result
//! stays until it is evicted by capacity or [`MemoCache::clear`] is called.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Hit/miss counters for one cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that had to derive the value
    pub misses: u64,
    /// Entries currently held
    pub entries: usize,
}

/// Cache keyed by query parameters, holding at most `capacity` entries.
///
/// When full, inserting a new key evicts the oldest inserted one.
pub struct MemoCache<K, V> {
    name: &'static str,
    capacity: usize,
    entries: DashMap<K, V>,
    // Insertion order, oldest first. Held while inserting or evicting.
    order: Mutex<VecDeque<K>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache. A capacity of zero is raised to one.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            capacity: capacity.max(1),
            entries: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cached value for `key`, if any. Counts as a hit or a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        let value = self.entries.get(key).map(|entry| entry.value().clone());
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(cache = self.name, "cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(cache = self.name, "cache miss");
        }
        value
    }

    /// Store `value` under `key`, evicting the oldest entries when full.
    pub fn insert(&self, key: K, value: V) {
        let mut order = self.order.lock();
        if self.entries.contains_key(&key) {
            self.entries.insert(key, value);
            return;
        }

        while self.entries.len() >= self.capacity {
            match order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        order.push_back(key.clone());
        self.entries.insert(key, value);
    }

    /// Return the cached value for `key`, or derive and store it.
    ///
    /// No lock is held while `derive` runs. Errors are returned as-is
    /// and nothing is cached for them.
    pub fn get_or_try_insert_with<E, F>(&self, key: K, derive: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let value = derive()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Whether `key` currently has a cached value.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Drop every cached value. Counters are kept.
    pub fn clear(&self) {
        let mut order = self.order.lock();
        order.clear();
        self.entries.clear();
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }

    /// Maximum number of entries.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<K, V> fmt::Debug for MemoCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoCache")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_repeated_key_derives_once() {
        let cache: MemoCache<u32, String> = MemoCache::new("test", 4);
        let calls = Cell::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_try_insert_with::<(), _>(7, || {
                    calls.set(calls.get() + 1);
                    Ok("seven".to_string())
                })
                .unwrap();
            assert_eq!(value, "seven");
        }

        assert_eq!(calls.get(), 1);
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 2,
                misses: 1,
                entries: 1,
            }
        );
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache: MemoCache<u32, u32> = MemoCache::new("test", 4);

        let first: Result<u32, &str> = cache.get_or_try_insert_with(1, || Err("boom"));
        assert!(first.is_err());
        assert!(!cache.contains(&1));

        let second: Result<u32, &str> = cache.get_or_try_insert_with(1, || Ok(10));
        assert_eq!(second, Ok(10));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache: MemoCache<u32, u32> = MemoCache::new("test", 2);
        for key in 0..3 {
            cache
                .get_or_try_insert_with::<(), _>(key, || Ok(key * 10))
                .unwrap();
        }

        assert!(!cache.contains(&0));
        assert!(cache.contains(&1));
        assert!(cache.contains(&2));
        assert_eq!(cache.stats().entries, 2);
    }

    #[test]
    fn test_clear_keeps_counters() {
        let cache: MemoCache<(), u32> = MemoCache::new("test", 0);
        assert_eq!(cache.capacity(), 1);

        cache.get_or_try_insert_with::<(), _>((), || Ok(1)).unwrap();
        cache.clear();

        assert!(!cache.contains(&()));
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_reinserting_a_key_keeps_its_slot() {
        let cache: MemoCache<u32, u32> = MemoCache::new("test", 2);
        cache.insert(1, 10);
        cache.insert(2, 20);
        cache.insert(1, 11);
        cache.insert(3, 30);

        assert!(!cache.contains(&1));
        assert_eq!(cache.get(&2), Some(20));
        assert_eq!(cache.get(&3), Some(30));
    }

    #[test]
    fn test_concurrent_readers_stay_within_capacity() {
        let cache: MemoCache<u32, u32> = MemoCache::new("test", 3);

        std::thread::scope(|scope| {
            for worker in 0..4u32 {
                let cache = &cache;
                scope.spawn(move || {
                    for key in 0..20u32 {
                        let value = cache
                            .get_or_try_insert_with::<(), _>((key + worker) % 5, || Ok(key))
                            .unwrap();
                        assert!(value < 20);
                    }
                });
            }
        });

        let stats = cache.stats();
        assert!(stats.entries <= 3);
        assert_eq!(stats.hits + stats.misses, 80);
    }
}
