//! # lrucache
//!
//! A thread-safe, size-weighted LRU cache.
//!
//! - Each entry carries a caller-supplied size; the cache keeps the sum of
//!   sizes within a fixed capacity by evicting the least-recently-used
//!   entries.
//! - [`Cache::get_ensure`] computes a missing value **outside** the cache
//!   lock and keeps at most one value per key when callers race.
//! - An optional [`RemovalListener`](listener::RemovalListener) sees every
//!   value that leaves the cache, after the lock has been released.
//!
//! ```
//! use lrucache::{Cache, CacheBuilder};
//! use lrucache::listener::RemovalCause;
//!
//! let cache: Cache<u32, String> = CacheBuilder::new(3)
//!     .removal_listener(|key: &u32, _old, _new, cause| {
//!         if cause == RemovalCause::Capacity {
//!             println!("evicted {key}");
//!         }
//!     })
//!     .build();
//!
//! cache.put(1, "one".to_string());
//! let two = cache.get_ensure(&2, |k| (k.to_string(), 2));
//! assert_eq!(*two, "2");
//! assert_eq!(cache.size(), 3);
//! ```

mod builder;
mod cache;
mod error;
mod index;
mod metrics;
pub mod listener;
pub mod weigher;

pub use builder::CacheBuilder;
pub use cache::Cache;
pub use error::{Error, Result};
pub use metrics::stats::Metrics;
