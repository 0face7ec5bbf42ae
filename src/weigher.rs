//! Entry weigher — assigns the size used by [`Cache::put`](crate::Cache::put).
//!
//! The cache enforces `Σ size(entry) ≤ capacity`.  By default every entry
//! costs 1 unit (`UnitWeigher`), so `capacity` is simply the maximum number
//! of entries and `put(k, v)` behaves like `put_size(k, v, 1)`.  Callers that
//! know the size up front can skip the weigher and use `put_size` or return
//! the size from the `get_ensure` closure.
//!
//! # Example
//! ```
//! use lrucache::CacheBuilder;
//!
//! // Cap at ~10 MB total value size (keys are not counted).
//! let cache: lrucache::Cache<String, Vec<u8>> = CacheBuilder::new(10 * 1024 * 1024)
//!     .weigher(|_key: &String, val: &Vec<u8>| val.len() as u64)
//!     .build();
//! cache.put("blob".to_string(), vec![0u8; 4096]);
//! assert_eq!(cache.size(), 4096);
//! ```

/// Computes the size of a cache entry.
///
/// Zero is a legal size; such entries never trigger eviction on their own.
pub trait Weigher<K, V>: Send + Sync + 'static {
    fn weigh(&self, key: &K, value: &V) -> u64;
}

/// Every entry costs exactly 1 unit.  This is the default weigher.
pub struct UnitWeigher;

impl<K, V> Weigher<K, V> for UnitWeigher {
    #[inline]
    fn weigh(&self, _key: &K, _value: &V) -> u64 {
        1
    }
}

/// A weigher backed by a closure.
///
/// Created via [`CacheBuilder::weigher`](crate::CacheBuilder::weigher).
pub struct FnWeigher<F>(pub F);

impl<K, V, F> Weigher<K, V> for FnWeigher<F>
where
    F: Fn(&K, &V) -> u64 + Send + Sync + 'static,
{
    #[inline]
    fn weigh(&self, key: &K, value: &V) -> u64 {
        (self.0)(key, value)
    }
}
