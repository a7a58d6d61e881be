//! Process-wide response cache keyed by exact query string.
//!
//! Constructed once at startup and passed by reference to the search
//! provider; never a bare global. Entries expire after a TTL, and once the
//! size cap is exceeded the single oldest entry is dropped.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

pub(crate) struct TtlCache<V> {
    inner: Mutex<HashMap<String, Entry<V>>>,
    ttl: Duration,
    max_entries: usize,
}

impl<V: Clone> TtlCache<V> {
    pub(crate) fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Returns a fresh entry for the key, dropping it if it has aged out.
    pub(crate) fn get(&self, key: &str) -> Option<V> {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = map.get(key) {
            if entry.stored_at.elapsed() < self.ttl {
                return Some(entry.value.clone());
            }
            map.remove(key);
        }
        None
    }

    pub(crate) fn put(&self, key: String, value: V) {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );

        while map.len() > self.max_entries {
            let oldest = map
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    map.remove(&k);
                }
                None => break,
            }
        }
    }

    pub(crate) fn evict(&self, key: &str) {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(key);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_roundtrip() {
        let cache = TtlCache::new(Duration::from_secs(60), 10);
        cache.put("q".to_string(), 42u32);
        assert_eq!(cache.get("q"), Some(42));
        assert_eq!(cache.get("other"), None);
    }

    #[test]
    fn test_expired_entry_not_served() {
        let cache = TtlCache::new(Duration::ZERO, 10);
        cache.put("q".to_string(), 1u32);
        assert_eq!(cache.get("q"), None);
        // The stale entry is dropped on access.
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_size_cap_evicts_oldest() {
        let cache = TtlCache::new(Duration::from_secs(60), 2);
        cache.put("a".to_string(), 1u32);
        std::thread::sleep(Duration::from_millis(5));
        cache.put("b".to_string(), 2u32);
        std::thread::sleep(Duration::from_millis(5));
        cache.put("c".to_string(), 3u32);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn test_explicit_evict() {
        let cache = TtlCache::new(Duration::from_secs(60), 10);
        cache.put("q".to_string(), 9u32);
        cache.evict("q");
        assert_eq!(cache.get("q"), None);
    }
}
