//! Persistent expiring key/value cache.
//!
//! Every network response and the final listing set go through a
//! [`CacheStore`], which keeps an in-memory index in front of one file per key
//! on disk. It is the only thing standing between repeated runs and the
//! rate-limited upstream endpoints.
//!
//! # Architecture
//!
//! * [`store`]: the store itself, its on-disk layout and its error type.
//! * [`entry`]: the values and entries kept in the store.
//!
//! # Expiry
//!
//! Entries carry an absolute expiry timestamp (seconds since the Unix epoch).
//! Expiry is lazy: an entry is checked, and deleted from both layers if stale,
//! only when it is read with [`CacheStore::get`]. There is no background sweep.
//!
//! # Concurrency
//!
//! The on-disk layer is shared by every process that points at the same cache
//! directory. Nothing coordinates them: there is no file locking, so two
//! processes writing the same key at the same time race and the last rename
//! wins.

pub mod entry;
pub mod store;

pub use entry::{CacheEntry, CacheValue};
pub use store::{CacheError, CacheResult, CacheStore, Clock, SystemClock};
