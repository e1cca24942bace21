use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::debug;

/// TTL-evicting memo cache for rendered HTML and other derived text.
///
/// Explicitly constructed and passed to its users; nothing here is
/// global. Writes are append-only by key: a fresh entry is never
/// overwritten in place, so concurrent renders of the same input
/// converge on one stored value (recomputation is idempotent, a
/// stampede is merely wasted work). Expired entries are dropped lazily
/// on read; `flush` drops everything.
///
/// Keys come from [`ContentCache::content_key`]: SHA-256 over content
/// and path. The strength is incidental; 256-bit digests cannot
/// collide over any practical corpus, which is all the contract asks.
pub struct ContentCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

struct CacheEntry {
    value: String,
    inserted_at: Instant,
}

impl ContentCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cache key for a piece of content processed under a path hint.
    pub fn content_key(content: &str, path: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hasher.update([0u8]);
        hasher.update(path.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let expired = {
            let entries = self.entries.read().unwrap();
            match entries.get(key) {
                Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                    return Some(entry.value.clone());
                }
                Some(_) => true,
                None => false,
            }
        };

        if expired {
            let mut entries = self.entries.write().unwrap();
            if let Some(entry) = entries.get(key)
                && entry.inserted_at.elapsed() >= self.ttl
            {
                entries.remove(key);
            }
        }
        None
    }

    pub fn insert(&self, key: String, value: String) {
        let mut entries = self.entries.write().unwrap();
        match entries.get(&key) {
            // Entries are immutable for their lifetime; keep the first write.
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {}
            _ => {
                entries.insert(
                    key,
                    CacheEntry {
                        value,
                        inserted_at: Instant::now(),
                    },
                );
            }
        }
    }

    pub fn flush(&self) {
        let mut entries = self.entries.write().unwrap();
        let dropped = entries.len();
        entries.clear();
        debug!("content cache flushed ({dropped} entries)");
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
