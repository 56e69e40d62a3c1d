//! Content-addressed look-aside cache for retrieval results (spec §4.3).

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// `hash(lowercase(collapse_whitespace(utterance)) || '\x00' || kb)`,
/// truncated to 128 bits and hex-encoded so it is a printable cache key.
/// Case and internal-whitespace variants of the same utterance collapse
/// to the same fingerprint (spec §8).
pub fn fingerprint(utterance: &str, knowledge_base: &str) -> String {
    let normalized = utterance.to_lowercase();
    let collapsed = normalized.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut hasher = Sha256::new();
    hasher.update(collapsed.as_bytes());
    hasher.update([0u8]);
    hasher.update(knowledge_base.as_bytes());
    let digest = hasher.finalize();

    digest[..16].iter().map(|b| format!("{b:02x}")).collect()
}

/// A cached retrieval payload plus its expiry.
#[derive(Debug, Clone)]
struct Entry {
    payload: String,
    expires_at: DateTime<Utc>,
}

/// Look-aside cache contract. A `get` failure is treated as a miss by
/// the caller; a `put` failure is logged and otherwise ignored — cache
/// failures are never fatal to a turn (spec §4.3).
pub trait RetrievalCache: Send + Sync {
    fn get(&self, fingerprint: &str) -> Option<String>;
    fn put(&self, fingerprint: &str, payload: String, ttl_seconds: u64);

    /// Proactively drops expired entries ahead of their next access.
    /// A no-op by default; `InMemoryRetrievalCache` is the only
    /// implementation that actually holds entries to sweep.
    fn sweep_expired(&self) -> usize {
        0
    }
}

/// In-process TTL cache, bounded by entry count with oldest-write
/// eviction once `max_entries` is exceeded.
pub struct InMemoryRetrievalCache {
    entries: Mutex<HashMap<String, Entry>>,
    max_entries: usize,
}

impl InMemoryRetrievalCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries,
        }
    }
}

impl RetrievalCache for InMemoryRetrievalCache {
    fn get(&self, fingerprint: &str) -> Option<String> {
        let mut entries = self.entries.lock();
        match entries.get(fingerprint) {
            Some(e) if e.expires_at > Utc::now() => Some(e.payload.clone()),
            Some(_) => {
                entries.remove(fingerprint);
                None
            }
            None => None,
        }
    }

    fn put(&self, fingerprint: &str, payload: String, ttl_seconds: u64) {
        let mut entries = self.entries.lock();
        if entries.len() >= self.max_entries && !entries.contains_key(fingerprint) {
            if let Some(oldest_key) = entries
                .iter()
                .min_by_key(|(_, e)| e.expires_at)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&oldest_key);
            }
        }
        entries.insert(
            fingerprint.to_owned(),
            Entry {
                payload,
                expires_at: Utc::now() + chrono::Duration::seconds(ttl_seconds as i64),
            },
        );
    }

    /// Drops every entry whose TTL has already elapsed. `get`/`put`
    /// already evict lazily on access, but a quiet fingerprint that is
    /// never looked up again would otherwise sit in the map until the
    /// size bound forces an eviction; a periodic sweep bounds that too.
    fn sweep_expired(&self) -> usize {
        let mut entries = self.entries.lock();
        let now = Utc::now();
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        before - entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_ignores_case_and_whitespace() {
        let a = fingerprint("What  is   the Loan  Policy?", "policy");
        let b = fingerprint("what is the loan policy?", "policy");
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_distinguishes_knowledge_base() {
        let a = fingerprint("what is the loan policy", "policy");
        let b = fingerprint("what is the loan policy", "management");
        assert_ne!(a, b);
    }

    #[test]
    fn round_trips_through_cache() {
        let cache = InMemoryRetrievalCache::new(10);
        let fp = fingerprint("hello", "general");
        assert!(cache.get(&fp).is_none());
        cache.put(&fp, "payload".into(), 3600);
        assert_eq!(cache.get(&fp).as_deref(), Some("payload"));
    }

    #[test]
    fn expired_entry_is_a_miss() {
        let cache = InMemoryRetrievalCache::new(10);
        let fp = fingerprint("hello", "general");
        cache.put(&fp, "payload".into(), 0);
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(cache.get(&fp).is_none());
    }

    #[test]
    fn sweep_removes_expired_entries_without_a_get() {
        let cache = InMemoryRetrievalCache::new(10);
        let fp = fingerprint("hello", "general");
        cache.put(&fp, "payload".into(), 0);
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert_eq!(cache.sweep_expired(), 1);
        assert_eq!(cache.entries.lock().len(), 0);
    }
}
