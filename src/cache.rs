use std::convert::Infallible;
use std::hash::Hash;
use std::sync::Arc;
use log::{debug, trace};
use parking_lot::RwLock;

use crate::builder::CacheBuilder;
use crate::index::LruIndex;
use crate::listener::{Removal, RemovalCause, RemovalListener};
use crate::metrics::stats::{Metrics, StatsCounter};
use crate::weigher::Weigher;

// ---------------------------------------------------------------------------
// Cache interior
// ---------------------------------------------------------------------------

/// Shared interior of a [`Cache`].
pub(crate) struct Inner<K, V> {
    /// Every operation that reads or reorders recency takes the write half;
    /// the read half is for size and membership queries only.
    pub(crate) index: RwLock<LruIndex<K, V>>,
    pub(crate) capacity: u64,
    pub(crate) weigher: Box<dyn Weigher<K, V>>,
    /// Optional removal listener.  `None` if the user didn't register one.
    pub(crate) listener: Option<Box<dyn RemovalListener<K, V>>>,
    pub(crate) metrics: StatsCounter,
}

// ---------------------------------------------------------------------------
// Cache handle
// ---------------------------------------------------------------------------

/// A concurrent, size-weighted LRU cache.
///
/// Each entry carries a size; the cache keeps the sum of sizes within its
/// capacity by evicting least-recently-used entries.  Every value that leaves
/// the cache is reported to the removal listener, after the internal lock
/// has been released.
///
/// # Example
/// ```
/// use lrucache::Cache;
/// use std::sync::Arc;
///
/// let cache: Cache<&str, String> = Cache::new(5);
/// cache.put_size("a", "alpha".to_string(), 4);
/// cache.put_size("b", "beta".to_string(), 3); // evicts "a"
/// assert_eq!(cache.get(&"a"), None);
/// assert_eq!(cache.get(&"b"), Some(Arc::new("beta".to_string())));
/// assert_eq!(cache.size(), 3);
/// ```
pub struct Cache<K, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Cache {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Creates a cache bounded by `capacity` with no removal listener.
    ///
    /// # Panics
    /// If `capacity` is 0.
    pub fn new(capacity: u64) -> Self {
        CacheBuilder::new(capacity).build()
    }

    /// Returns a [`CacheBuilder`] for constructing a new cache.
    pub fn builder(capacity: u64) -> CacheBuilder<K, V> {
        CacheBuilder::new(capacity)
    }

    pub(crate) fn new_inner(
        capacity: u64,
        initial_capacity: usize,
        weigher: Box<dyn Weigher<K, V>>,
        listener: Option<Box<dyn RemovalListener<K, V>>>,
    ) -> Self {
        debug!(
            "lru cache created: capacity={} listener={}",
            capacity,
            listener.is_some()
        );
        Cache {
            inner: Arc::new(Inner {
                index: RwLock::new(LruIndex::with_capacity(initial_capacity)),
                capacity,
                weigher,
                listener,
                metrics: StatsCounter::new(),
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Returns the value for `key` and marks it most-recently-used.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let value = self.inner.index.write().get(key).cloned();
        match value {
            Some(_) => self.inner.metrics.record_hit(),
            None => self.inner.metrics.record_miss(),
        }
        value
    }

    /// Returns the value for `key` without changing its recency or the stats.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.inner.index.read().peek(key).cloned()
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Caches `value` for `key` with the size given by the configured weigher
    /// (1 unless [`CacheBuilder::weigher`] was used).
    ///
    /// See [`put_size`](Self::put_size).
    pub fn put(&self, key: K, value: V) -> Option<Arc<V>> {
        let size = self.inner.weigher.weigh(&key, &value);
        self.put_size(key, value, size)
    }

    /// Caches `value` for `key` as the most-recently-used entry.
    ///
    /// Returns the value it replaced, if any.  Once the lock is released the
    /// listener sees the replacement first, then every entry evicted to make
    /// room, coldest first.
    pub fn put_size(&self, key: K, value: V, size: u64) -> Option<Arc<V>> {
        let value = Arc::new(value);
        let mut removals = Vec::new();
        let old_value = {
            let mut index = self.inner.index.write();
            self.write_locked(&mut index, key, value, size, &mut removals)
        };
        self.notify(removals);
        old_value
    }

    /// Returns the value for `key`, computing it with `create` on a miss.
    ///
    /// `create` returns the value and its size.  It runs without the cache
    /// lock held, so other keys stay usable however long it takes.  When
    /// several callers miss the same key at once, each may compute a value;
    /// the first to store it wins, every other caller gets the winner's value
    /// back and its own value is reported to the listener as
    /// [`RemovalCause::RaceLost`].
    ///
    /// # Example
    /// ```
    /// use lrucache::Cache;
    ///
    /// let cache: Cache<u64, String> = Cache::new(100);
    /// let v = cache.get_ensure(&7, |k| (format!("value-{k}"), 1));
    /// assert_eq!(*v, "value-7");
    /// // A hit never calls `create`.
    /// let v = cache.get_ensure(&7, |_| unreachable!());
    /// assert_eq!(*v, "value-7");
    /// ```
    pub fn get_ensure<F>(&self, key: &K, create: F) -> Arc<V>
    where
        F: FnOnce(&K) -> (V, u64),
    {
        match self.try_get_ensure(key, |k| Ok::<_, Infallible>(create(k))) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible form of [`get_ensure`](Self::get_ensure).
    ///
    /// An error from `create` is returned as-is and leaves the cache exactly
    /// as it was: nothing is inserted and the listener is not called.
    ///
    /// # Example
    /// ```
    /// use lrucache::Cache;
    ///
    /// let cache: Cache<String, u64> = Cache::new(10);
    /// let parsed = cache.try_get_ensure(&"12".to_string(), |k| k.parse::<u64>().map(|n| (n, 1)));
    /// assert_eq!(parsed.map(|v| *v), Ok(12));
    /// let bad = cache.try_get_ensure(&"x".to_string(), |k| k.parse::<u64>().map(|n| (n, 1)));
    /// assert!(bad.is_err());
    /// assert_eq!(cache.entry_count(), 1);
    /// ```
    pub fn try_get_ensure<F, E>(&self, key: &K, create: F) -> Result<Arc<V>, E>
    where
        F: FnOnce(&K) -> Result<(V, u64), E>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        // May take a long time; the index may look different once it returns.
        let (value, size) = create(key)?;
        let value = Arc::new(value);
        self.inner.metrics.record_fill();

        let mut removals = Vec::new();
        let winner = {
            let mut index = self.inner.index.write();
            let winner = index.get(key).cloned();
            if winner.is_none() {
                self.write_locked(&mut index, key.clone(), Arc::clone(&value), size, &mut removals);
            }
            winner
        };

        match winner {
            Some(winner) => {
                trace!("fill race lost, discarding computed value");
                self.inner.metrics.record_race_lost();
                self.notify(vec![Removal::new(key.clone(), value, RemovalCause::RaceLost)]);
                Ok(winner)
            }
            None => {
                self.notify(removals);
                Ok(value)
            }
        }
    }

    /// Removes the entry for `key`, returning its value if it was present.
    pub fn remove(&self, key: &K) -> Option<Arc<V>> {
        let entry = self.inner.index.write().remove(key)?;
        let value = Arc::clone(&entry.value);
        self.notify(vec![Removal::new(entry.key, entry.value, RemovalCause::Explicit)]);
        Some(value)
    }

    /// Removes every entry, reporting each to the listener coldest first.
    pub fn clear(&self) {
        let drained = self.inner.index.write().drain();
        debug!("lru cache cleared: {} entries", drained.len());
        self.notify(
            drained
                .into_iter()
                .map(|e| Removal::new(e.key, e.value, RemovalCause::Explicit))
                .collect(),
        );
    }

    /// Shared write path of `put_size` and a won `get_ensure` fill.
    ///
    /// Must be called with the write lock held; queues the resulting removal
    /// events into `removals` for dispatch after unlock.
    fn write_locked(
        &self,
        index: &mut LruIndex<K, V>,
        key: K,
        value: Arc<V>,
        size: u64,
        removals: &mut Vec<Removal<K, V>>,
    ) -> Option<Arc<V>> {
        let capacity = self.inner.capacity;
        if size > capacity {
            debug!("entry of size {} exceeds capacity {}, admitted as sole resident", size, capacity);
        }

        let old_value = index.upsert(key, Arc::clone(&value), size).map(|(key, old)| {
            removals.push(Removal::replaced(key, Arc::clone(&old), value));
            old
        });

        let evicted = index.trim(capacity);
        if !evicted.is_empty() {
            trace!(
                "evicted {} entries, size now {}/{}",
                evicted.len(),
                index.total_size(),
                capacity
            );
            self.inner.metrics.record_eviction(evicted.len() as u64);
            removals.extend(
                evicted
                    .into_iter()
                    .map(|e| Removal::new(e.key, e.value, RemovalCause::Capacity)),
            );
        }
        old_value
    }

    /// Delivers removal events.  Never called with the lock held.
    fn notify(&self, removals: Vec<Removal<K, V>>) {
        if let Some(listener) = &self.inner.listener {
            for removal in removals {
                removal.deliver(listener.as_ref());
            }
        }
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Current sum of entry sizes.
    pub fn size(&self) -> u64 {
        self.inner.index.read().total_size()
    }

    /// The fixed upper bound for [`size`](Self::size).
    pub fn capacity(&self) -> u64 {
        self.inner.capacity
    }

    pub fn stats(&self) -> Metrics {
        self.inner.metrics.snapshot()
    }

    pub fn entry_count(&self) -> usize {
        self.inner.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    /// Returns `true` if the key is present, without touching recency.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.index.read().contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    type Event = (u32, u32, Option<u32>, RemovalCause);

    fn recording_cache(capacity: u64) -> (Cache<u32, u32>, Arc<Mutex<Vec<Event>>>) {
        let log: Arc<Mutex<Vec<Event>>> = Arc::new(Mutex::new(Vec::new()));
        let log2 = Arc::clone(&log);
        let cache = CacheBuilder::new(capacity)
            .removal_listener(move |k: &u32, old: Arc<u32>, new: Option<Arc<u32>>, cause| {
                log2.lock().unwrap().push((*k, *old, new.map(|v| *v), cause));
            })
            .build();
        (cache, log)
    }

    #[test]
    fn replacement_reported_before_evictions() {
        let (cache, log) = recording_cache(4);
        cache.put_size(1, 10, 1);
        cache.put_size(2, 20, 1);
        cache.put_size(3, 30, 1);
        // Growing 3 to size 3 pushes the total to 5: 1 is the coldest.
        assert_eq!(cache.put_size(3, 31, 3).map(|v| *v), Some(30));
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                (3, 30, Some(31), RemovalCause::Replaced),
                (1, 10, None, RemovalCause::Capacity),
            ]
        );
        assert_eq!(cache.size(), 4);
    }

    #[test]
    fn lost_race_reports_discarded_value() {
        let (cache, log) = recording_cache(10);
        // Simulate a concurrent winner landing while `create` runs.
        let winner = cache.get_ensure(&7, |k| {
            cache.put(*k, 700);
            (701, 1)
        });
        assert_eq!(*winner, 700);
        assert_eq!(cache.get(&7).map(|v| *v), Some(700));
        assert_eq!(*log.lock().unwrap(), vec![(7, 701, None, RemovalCause::RaceLost)]);
        let stats = cache.stats();
        assert_eq!((stats.fills, stats.races_lost), (1, 1));
    }

    #[test]
    fn lost_race_promotes_winner() {
        let (cache, _log) = recording_cache(2);
        cache.put(1, 10);
        let winner = cache.get_ensure(&7, |k| {
            cache.put(*k, 700);
            cache.put(8, 800); // evicts 1, leaves 7 as the coldest
            (701, 1)
        });
        assert_eq!(*winner, 700);
        // The winner was read on the re-check, so 8 is now the coldest.
        cache.put(9, 900);
        assert!(cache.contains(&7));
        assert!(!cache.contains(&8));
    }

    #[test]
    fn failed_fill_leaves_cache_untouched() {
        let (cache, log) = recording_cache(10);
        cache.put(1, 10);
        let result: Result<Arc<u32>, &str> = cache.try_get_ensure(&2, |_| Err("boom"));
        assert_eq!(result, Err("boom"));
        assert_eq!(cache.entry_count(), 1);
        assert_eq!(cache.size(), 1);
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(cache.stats().fills, 0);
    }

    #[test]
    fn clear_reports_every_entry_coldest_first() {
        let (cache, log) = recording_cache(10);
        cache.put(1, 10);
        cache.put(2, 20);
        cache.get(&1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.size(), 0);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                (2, 20, None, RemovalCause::Explicit),
                (1, 10, None, RemovalCause::Explicit),
            ]
        );
    }
}
