//! Removal listener — a callback invoked whenever a value leaves the cache.
//!
//! Events are collected while the cache lock is held and delivered only after
//! it has been released, so a listener may call back into the cache.
//!
//! # Example
//! ```
//! use lrucache::CacheBuilder;
//! use lrucache::listener::RemovalCause;
//! use std::sync::{Arc, Mutex};
//!
//! let log: Arc<Mutex<Vec<(u64, RemovalCause)>>> = Arc::new(Mutex::new(Vec::new()));
//! let log2 = Arc::clone(&log);
//!
//! let cache: lrucache::Cache<u64, u64> = CacheBuilder::new(2)
//!     .removal_listener(move |key: &u64, _old, _new, cause| {
//!         log2.lock().unwrap().push((*key, cause));
//!     })
//!     .build();
//!
//! cache.put(1, 10);
//! cache.put(2, 20);
//! cache.put(3, 30); // capacity eviction of key 1
//! cache.put(2, 21); // replacement
//! assert_eq!(
//!     *log.lock().unwrap(),
//!     vec![(1, RemovalCause::Capacity), (2, RemovalCause::Replaced)]
//! );
//! ```

use std::sync::Arc;

// ---------------------------------------------------------------------------
// RemovalCause
// ---------------------------------------------------------------------------

/// The reason a value left the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemovalCause {
    /// Overwritten by `put`/`put_size`; the listener gets the new value too.
    Replaced,
    /// Evicted from the cold end to bring the total size back within capacity.
    Capacity,
    /// Removed via [`Cache::remove`] or [`Cache::clear`].
    ///
    /// [`Cache::remove`]: crate::Cache::remove
    /// [`Cache::clear`]: crate::Cache::clear
    Explicit,
    /// Computed by a [`Cache::get_ensure`] caller that lost the fill race to
    /// another caller; this value was never stored.
    ///
    /// [`Cache::get_ensure`]: crate::Cache::get_ensure
    RaceLost,
}

// ---------------------------------------------------------------------------
// RemovalListener trait
// ---------------------------------------------------------------------------

/// A callback invoked once for every value that leaves the cache.
///
/// The callback receives:
/// - a reference to the key,
/// - the value being dropped from the cache,
/// - the value that replaced it (`Some` only for [`RemovalCause::Replaced`]),
/// - the reason for removal.
///
/// The listener runs on the thread that performed the operation, after the
/// cache lock has been released. By the time it runs, other threads may
/// already have changed the entry again.
pub trait RemovalListener<K, V>: Send + Sync + 'static {
    fn on_removed(&self, key: &K, old_value: Arc<V>, new_value: Option<Arc<V>>, cause: RemovalCause);
}

/// A [`RemovalListener`] backed by a closure.
///
/// Created via [`CacheBuilder::removal_listener`](crate::CacheBuilder::removal_listener).
pub struct FnListener<F>(pub F);

impl<K, V, F> RemovalListener<K, V> for FnListener<F>
where
    F: Fn(&K, Arc<V>, Option<Arc<V>>, RemovalCause) + Send + Sync + 'static,
{
    fn on_removed(&self, key: &K, old_value: Arc<V>, new_value: Option<Arc<V>>, cause: RemovalCause) {
        (self.0)(key, old_value, new_value, cause)
    }
}

// ---------------------------------------------------------------------------
// Pending events
// ---------------------------------------------------------------------------

/// A removal recorded under the lock, delivered after it is released.
pub(crate) struct Removal<K, V> {
    pub(crate) key: K,
    pub(crate) old_value: Arc<V>,
    pub(crate) new_value: Option<Arc<V>>,
    pub(crate) cause: RemovalCause,
}

impl<K: 'static, V: 'static> Removal<K, V> {
    pub(crate) fn new(key: K, old_value: Arc<V>, cause: RemovalCause) -> Self {
        Removal {
            key,
            old_value,
            new_value: None,
            cause,
        }
    }

    pub(crate) fn replaced(key: K, old_value: Arc<V>, new_value: Arc<V>) -> Self {
        Removal {
            key,
            old_value,
            new_value: Some(new_value),
            cause: RemovalCause::Replaced,
        }
    }

    pub(crate) fn deliver(self, listener: &dyn RemovalListener<K, V>) {
        listener.on_removed(&self.key, self.old_value, self.new_value, self.cause);
    }
}
