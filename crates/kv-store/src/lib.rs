//! Key-value cache used for OAuth state and credential records
//!
//! Every entry carries a flat time-to-live. There is no eviction policy
//! beyond expiry: a key lives until its TTL elapses or it is deleted.
//!
//! The `KeyValueStore` trait is the seam the OAuth flow talks to. The
//! in-process `MemoryStore` implements it; a networked cache can implement
//! the same three operations without touching callers.

pub mod error;
pub mod memory;

pub use error::{Error, Result};
pub use memory::{MemoryStore, spawn_sweeper};

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Boxed future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Get/set/delete with TTL.
///
/// Uses `Pin<Box<dyn Future>>` return types so the store can be shared as
/// `Arc<dyn KeyValueStore>`.
pub trait KeyValueStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value and its TTL.
    fn set<'a>(&'a self, key: &'a str, value: String, ttl: Duration) -> StoreFuture<'a, ()>;

    /// Fetch a live value. Expired entries read as `None`.
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

    /// Remove `key`. Returns whether a live entry was removed.
    fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, bool>;
}
