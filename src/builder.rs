use std::hash::Hash;
use std::sync::Arc;
use crate::cache::Cache;
use crate::error::{Error, Result};
use crate::listener::{FnListener, RemovalCause, RemovalListener};
use crate::weigher::{FnWeigher, UnitWeigher, Weigher};

/// Builder for configuring and constructing a [`Cache`].
///
/// # Example
/// ```
/// use lrucache::CacheBuilder;
///
/// let cache: lrucache::Cache<String, String> = CacheBuilder::new(1_000)
///     .initial_capacity(128)
///     .build();
/// assert_eq!(cache.capacity(), 1_000);
/// ```
pub struct CacheBuilder<K, V> {
    capacity: u64,
    initial_capacity: usize,
    weigher: Box<dyn Weigher<K, V>>,
    listener: Option<Box<dyn RemovalListener<K, V>>>,
}

impl<K: 'static, V: 'static> CacheBuilder<K, V> {
    /// `capacity` bounds the sum of entry sizes and must be greater than 0;
    /// this is checked by [`try_build`](Self::try_build).
    pub fn new(capacity: u64) -> Self {
        CacheBuilder {
            capacity,
            initial_capacity: 0,
            weigher: Box::new(UnitWeigher),
            listener: None,
        }
    }

    /// Pre-allocate room for `entries` entries (default: 0).
    pub fn initial_capacity(mut self, entries: usize) -> Self {
        self.initial_capacity = entries;
        self
    }

    /// Register a removal listener closure.
    ///
    /// The closure is called on the calling thread, **after** the cache lock
    /// has been released, once for every value that leaves the cache:
    /// replaced, evicted, removed, cleared, or discarded after a lost
    /// `get_ensure` race.
    ///
    /// # Example
    /// ```
    /// use lrucache::CacheBuilder;
    ///
    /// let cache: lrucache::Cache<u64, u64> = CacheBuilder::new(10)
    ///     .removal_listener(|key: &u64, old, new, cause| {
    ///         println!("removed key={key} old={old} new={new:?} cause={cause:?}");
    ///     })
    ///     .build();
    /// ```
    pub fn removal_listener<F>(mut self, f: F) -> Self
    where
        F: Fn(&K, Arc<V>, Option<Arc<V>>, RemovalCause) + Send + Sync + 'static,
    {
        self.listener = Some(Box::new(FnListener(f)));
        self
    }

    /// Register a removal listener via the [`RemovalListener`] trait.
    pub fn removal_listener_impl<L: RemovalListener<K, V>>(mut self, l: L) -> Self {
        self.listener = Some(Box::new(l));
        self
    }

    /// Set the weigher used by [`Cache::put`] via closure.
    ///
    /// # Example
    /// ```
    /// use lrucache::CacheBuilder;
    ///
    /// let cache: lrucache::Cache<String, Vec<u8>> = CacheBuilder::new(4096)
    ///     .weigher(|_k: &String, v: &Vec<u8>| v.len() as u64 + 1)
    ///     .build();
    /// ```
    pub fn weigher<F>(mut self, f: F) -> Self
    where
        F: Fn(&K, &V) -> u64 + Send + Sync + 'static,
    {
        self.weigher = Box::new(FnWeigher(f));
        self
    }

    /// Set a weigher using any type that implements the [`Weigher`] trait.
    pub fn weigher_impl<W: Weigher<K, V>>(mut self, w: W) -> Self {
        self.weigher = Box::new(w);
        self
    }
}

impl<K, V> CacheBuilder<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Builds the cache, rejecting an invalid configuration.
    pub fn try_build(self) -> Result<Cache<K, V>> {
        if self.capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        Ok(Cache::new_inner(
            self.capacity,
            self.initial_capacity,
            self.weigher,
            self.listener,
        ))
    }

    /// Builds the cache.
    ///
    /// # Panics
    /// If the capacity is 0.
    pub fn build(self) -> Cache<K, V> {
        match self.try_build() {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }
}
