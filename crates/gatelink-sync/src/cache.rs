//! Per-device cache of the last known user list.
//!
//! Cache-aside with lazy expiry: reads serve entries younger than the TTL,
//! anything older is dropped on sight, and there is no background
//! eviction. The map is mutex-guarded because list queries, syncs, and
//! revocations run concurrently across devices; the lock is only ever held
//! for the map operation itself, never across I/O.

use gatelink_core::Result;
use gatelink_core::constants::USER_LIST_TTL_SECS;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

struct CacheEntry {
    users: Vec<String>,
    captured_at: Instant,
}

/// Concurrency-safe user-list cache with a fixed time-to-live.
pub struct UserListCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl UserListCache {
    /// Cache with the standard 5-minute TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(USER_LIST_TTL_SECS))
    }

    /// Cache with a custom TTL. Production uses [`UserListCache::new`];
    /// this keeps expiry tests fast.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        UserListCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fresh entry for the device, or `None`. Entries at or past the TTL
    /// are removed here rather than waiting for a writer.
    #[must_use]
    pub fn get(&self, device_id: &str) -> Option<Vec<String>> {
        let mut entries = self.entries.lock();
        match entries.get(device_id) {
            Some(entry) if entry.captured_at.elapsed() < self.ttl => Some(entry.users.clone()),
            Some(_) => {
                entries.remove(device_id);
                None
            }
            None => None,
        }
    }

    /// Store a freshly loaded list, stamping it now.
    pub fn store(&self, device_id: impl Into<String>, users: Vec<String>) {
        self.entries.lock().insert(
            device_id.into(),
            CacheEntry {
                users,
                captured_at: Instant::now(),
            },
        );
    }

    /// Drop the device's entry unconditionally.
    pub fn invalidate(&self, device_id: &str) {
        self.entries.lock().remove(device_id);
    }

    /// Cache-aside read: serve a fresh entry, otherwise run the loader.
    ///
    /// Only successful loads are stored — a degraded (failed) load returns
    /// empty without populating the cache, so the next call re-queries
    /// instead of serving a cached empty list for the full TTL. The loader
    /// is awaited with no lock held.
    pub async fn get_or_load<F, Fut>(&self, device_id: &str, loader: F) -> Vec<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<String>>>,
    {
        if let Some(users) = self.get(device_id) {
            return users;
        }

        match loader().await {
            Ok(users) => {
                self.store(device_id, users.clone());
                users
            }
            Err(_) => Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for UserListCache {
    fn default() -> Self {
        Self::new()
    }
}
