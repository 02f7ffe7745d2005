//! Time-Based Strategy Module
//!
//! Capacity-bounded store kept in insertion order. Expired entries are removed
//! lazily on read and eagerly by the sweep; overflow drops the oldest insertion.

use indexmap::IndexMap;
use tracing::debug;

use crate::cache::{
    CacheControl, CacheEntry, CacheStats, CacheStrategy, KeyPattern, SharedClock,
};

// == Time-Based Strategy ==
#[derive(Debug)]
pub struct TimeBasedStrategy<V> {
    /// Entries in insertion order; overwriting a key keeps its position
    entries: IndexMap<String, CacheEntry<V>>,
    max_size: usize,
    clock: SharedClock,
    stats: CacheStats,
}

impl<V: Clone> TimeBasedStrategy<V> {
    pub fn new(max_size: usize, clock: SharedClock) -> Self {
        Self {
            entries: IndexMap::new(),
            max_size,
            clock,
            stats: CacheStats::new(),
        }
    }

    // == Evict Oldest ==
    /// Drops the first-inserted entry.
    fn evict_oldest(&mut self) {
        if let Some((key, _)) = self.entries.shift_remove_index(0) {
            self.stats.record_eviction();
            debug!("Time-based cache evicted oldest entry '{}'", key);
        }
    }
}

impl<V: Clone> CacheStrategy<V> for TimeBasedStrategy<V> {
    fn get(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let now = self.clock.now_ms();

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.entries.shift_remove(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        self.entries.get(key).cloned()
    }

    fn set(
        &mut self,
        key: &str,
        value: V,
        ttl_seconds: u64,
        cache_control: Option<CacheControl>,
    ) -> CacheEntry<V> {
        if !self.entries.contains_key(key) && self.entries.len() >= self.max_size {
            self.evict_oldest();
        }

        let entry = CacheEntry::new(key, value, ttl_seconds, self.clock.now_ms(), cache_control);
        self.entries.insert(key.to_string(), entry.clone());
        self.stats.record_set();
        entry
    }

    fn delete(&mut self, key: &str) -> bool {
        self.entries.shift_remove(key).is_some()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn size(&self) -> usize {
        self.entries.len()
    }

    fn invalidate(&mut self, pattern: &KeyPattern) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !pattern.matches(key));
        before - self.entries.len()
    }

    fn purge_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));

        let removed = before - self.entries.len();
        self.stats.record_expirations(removed);
        removed
    }

    fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    fn max_size(&self) -> usize {
        self.max_size
    }
}
