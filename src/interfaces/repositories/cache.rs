use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;

struct CachedEntry<T> {
    stored_at: Instant,
    value: T,
}

/// Time-bounded cache of list results, keyed by entity and filter.
///
/// Entries are only checked for age when read; nothing sweeps them.
/// Every invalidation bumps a generation counter, and a fetched result is
/// only stored when no invalidation happened since its fetch began.
pub struct QueryCache<T> {
    entries: DashMap<String, CachedEntry<T>>,
    generation: Mutex<u64>,
    ttl: Duration,
}

impl<T: Clone> QueryCache<T> {
    pub fn new(ttl: Duration) -> Self {
        QueryCache {
            entries: DashMap::new(),
            generation: Mutex::new(0),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        let entry = self.entries.get(key)?;
        if entry.stored_at.elapsed() < self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Token to take before fetching, handed back to [`put_if_current`](Self::put_if_current).
    pub fn generation(&self) -> u64 {
        *self.generation.lock()
    }

    /// Stores `value` unless the cache was invalidated after `generation` was taken.
    /// Returns whether the value was kept.
    pub fn put_if_current(&self, key: impl Into<String>, generation: u64, value: T) -> bool {
        let current = self.generation.lock();
        if *current != generation {
            return false;
        }
        self.entries.insert(
            key.into(),
            CachedEntry {
                stored_at: Instant::now(),
                value,
            },
        );
        true
    }

    pub fn invalidate_all(&self) {
        let mut current = self.generation.lock();
        *current = current.wrapping_add(1);
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
