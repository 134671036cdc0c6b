//! Short-lived per-provider response cache.
//!
//! Keyed by normalized request parameters. Entries past their TTL are
//! invisible to normal reads but are retained for stale-but-available
//! fallback when the upstream is unreachable.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::warn;

#[derive(Clone, Debug)]
struct CacheEntry<T> {
    value: T,
    stored_at: Instant,
    /// Wall-clock fetch time, reported to callers as source freshness.
    fetched_at: DateTime<Utc>,
}

/// TTL cache for one upstream concern.
#[derive(Debug)]
pub(crate) struct TtlCache<T> {
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Lock the entries mutex, recovering from poison if necessary.
    ///
    /// The worst case of recovering is serving a value that was mid-insert,
    /// which is indistinguishable from an ordinary racing write.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<T>>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Response cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Value within its TTL, if any.
    pub(crate) fn get_fresh(&self, key: &str) -> Option<(T, DateTime<Utc>)> {
        let entries = self.lock();
        entries
            .get(key)
            .filter(|e| e.stored_at.elapsed() <= self.ttl)
            .map(|e| (e.value.clone(), e.fetched_at))
    }

    /// Last successful value of any age - the stale-fallback read.
    pub(crate) fn get_any(&self, key: &str) -> Option<(T, DateTime<Utc>)> {
        let entries = self.lock();
        entries.get(key).map(|e| (e.value.clone(), e.fetched_at))
    }

    pub(crate) fn insert(&self, key: &str, value: T, fetched_at: DateTime<Utc>) {
        let mut entries = self.lock();
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
                fetched_at,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_within_ttl() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
        cache.insert("k", 7, Utc::now());
        assert_eq!(cache.get_fresh("k").map(|(v, _)| v), Some(7));
    }

    #[test]
    fn test_expired_invisible_to_fresh_reads_but_kept() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::ZERO);
        cache.insert("k", 7, Utc::now());
        std::thread::sleep(Duration::from_millis(5));

        assert!(cache.get_fresh("k").is_none());
        // Retained for stale fallback
        assert_eq!(cache.get_any("k").map(|(v, _)| v), Some(7));
    }

    #[test]
    fn test_miss_on_unknown_key() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
        assert!(cache.get_fresh("missing").is_none());
        assert!(cache.get_any("missing").is_none());
    }
}
