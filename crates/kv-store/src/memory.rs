//! In-process TTL store
//!
//! A tokio Mutex guards the map. Expired entries are dropped lazily on read
//! and in bulk by the optional background sweeper. Deadlines use
//! `tokio::time::Instant` so paused-clock tests can advance time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::{Error, KeyValueStore, StoreFuture};

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Shared in-memory key-value store with per-key expiry.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        entries.values().filter(|entry| entry.is_live(now)).count()
    }
}

impl KeyValueStore for MemoryStore {
    fn set<'a>(&'a self, key: &'a str, value: String, ttl: Duration) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let expires_at = Instant::now().checked_add(ttl).ok_or_else(|| {
                Error::Backend(format!("ttl of {}s is out of range", ttl.as_secs()))
            })?;
            let mut entries = self.entries.lock().await;
            entries.insert(key.to_owned(), Entry { value, expires_at });
            debug!(key, ttl_secs = ttl.as_secs(), "cache set");
            Ok(())
        })
    }

    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move {
            let now = Instant::now();
            let mut entries = self.entries.lock().await;
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
                Some(_) => {
                    entries.remove(key);
                    debug!(key, "cache entry expired");
                    Ok(None)
                }
                None => Ok(None),
            }
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let now = Instant::now();
            let mut entries = self.entries.lock().await;
            let removed = entries.remove(key).is_some_and(|entry| entry.is_live(now));
            debug!(key, removed, "cache delete");
            Ok(removed)
        })
    }
}

/// Spawn a background task that purges expired entries every `interval`.
pub fn spawn_sweeper(store: Arc<MemoryStore>, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick fires immediately; nothing can have expired yet
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let purged = store.purge_expired().await;
            if purged > 0 {
                debug!(purged, "swept expired cache entries");
            }
        }
    })
}
