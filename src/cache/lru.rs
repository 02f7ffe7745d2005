//! LRU Strategy Module
//!
//! Capacity-bounded store with O(1) least-recently-used eviction.
//!
//! Recency is tracked by a doubly linked list whose nodes live in an arena
//! and link to each other by slot index. The key map holds slot indices only;
//! the list owns the entries.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::{
    CacheControl, CacheEntry, CacheStats, CacheStrategy, KeyPattern, SharedClock,
};

// == List Node ==
#[derive(Debug)]
struct Node<V> {
    entry: CacheEntry<V>,
    prev: Option<usize>,
    next: Option<usize>,
}

// == Recency List ==
/// Arena-backed doubly linked list.
///
/// - Head = Most recently used
/// - Tail = Least recently used
#[derive(Debug)]
struct RecencyList<V> {
    slots: Vec<Option<Node<V>>>,
    /// Vacated slots available for reuse
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<V> RecencyList<V> {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    fn node(&self, idx: usize) -> Option<&Node<V>> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node<V>> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    fn entry(&self, idx: usize) -> Option<&CacheEntry<V>> {
        self.node(idx).map(|node| &node.entry)
    }

    // == Push Front ==
    /// Stores `entry` in a free slot and links it at the head.
    fn push_front(&mut self, entry: CacheEntry<V>) -> usize {
        let node = Node {
            entry,
            prev: None,
            next: None,
        };

        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        self.link_front(idx);
        self.len += 1;
        idx
    }

    fn link_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = old_head;
        }
        if let Some(head) = old_head {
            if let Some(node) = self.node_mut(head) {
                node.prev = Some(idx);
            }
        }

        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    // == Unlink ==
    /// Detaches a node from its neighbours without freeing its slot.
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match self.node(idx) {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.node_mut(p) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.node_mut(n) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = None;
        }
    }

    // == Move To Front ==
    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.link_front(idx);
    }

    // == Remove ==
    /// Unlinks a node, frees its slot and returns its entry.
    fn remove(&mut self, idx: usize) -> Option<CacheEntry<V>> {
        self.node(idx)?;
        self.unlink(idx);

        let node = self.slots.get_mut(idx).and_then(Option::take)?;
        self.free.push(idx);
        self.len -= 1;
        Some(node.entry)
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    fn len(&self) -> usize {
        self.len
    }
}

// == LRU Strategy ==
#[derive(Debug)]
pub struct LruStrategy<V> {
    /// Key to arena slot
    index: HashMap<String, usize>,
    list: RecencyList<V>,
    max_size: usize,
    clock: SharedClock,
    stats: CacheStats,
}

impl<V: Clone> LruStrategy<V> {
    pub fn new(max_size: usize, clock: SharedClock) -> Self {
        Self {
            index: HashMap::new(),
            list: RecencyList::new(),
            max_size,
            clock,
            stats: CacheStats::new(),
        }
    }

    /// Removes `key` from both the map and the list.
    fn remove_key(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let idx = self.index.remove(key)?;
        self.list.remove(idx)
    }

    // == Evict Tail ==
    fn evict_tail(&mut self) {
        let Some(tail) = self.list.tail else {
            return;
        };
        if let Some(entry) = self.list.remove(tail) {
            self.index.remove(&entry.key);
            self.stats.record_eviction();
            debug!("LRU cache evicted least recently used entry '{}'", entry.key);
        }
    }

    /// Removes every key in `keys`. Returns how many were present.
    fn remove_keys(&mut self, keys: Vec<String>) -> usize {
        keys.iter()
            .filter(|key| self.remove_key(key).is_some())
            .count()
    }

    /// Keys from most to least recently used.
    #[cfg(test)]
    fn keys_by_recency(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.list.len());
        let mut cursor = self.list.head;
        while let Some(idx) = cursor {
            let node = self.list.node(idx).expect("linked slot must be occupied");
            keys.push(node.entry.key.clone());
            cursor = node.next;
        }
        keys
    }
}

impl<V: Clone> CacheStrategy<V> for LruStrategy<V> {
    fn get(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let Some(&idx) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };

        let now = self.clock.now_ms();
        let expired = self
            .list
            .entry(idx)
            .map_or(true, |entry| entry.is_expired_at(now));

        if expired {
            self.remove_key(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        self.list.move_to_front(idx);
        self.stats.record_hit();
        self.list.entry(idx).cloned()
    }

    fn set(
        &mut self,
        key: &str,
        value: V,
        ttl_seconds: u64,
        cache_control: Option<CacheControl>,
    ) -> CacheEntry<V> {
        // An existing node is dropped so the insert below lands at the head
        let replaced = self.remove_key(key).is_some();
        if !replaced && self.index.len() >= self.max_size {
            self.evict_tail();
        }

        let entry = CacheEntry::new(key, value, ttl_seconds, self.clock.now_ms(), cache_control);
        let idx = self.list.push_front(entry.clone());
        self.index.insert(key.to_string(), idx);
        self.stats.record_set();
        entry
    }

    fn delete(&mut self, key: &str) -> bool {
        self.remove_key(key).is_some()
    }

    fn clear(&mut self) {
        self.index.clear();
        self.list.clear();
    }

    fn size(&self) -> usize {
        self.index.len()
    }

    fn invalidate(&mut self, pattern: &KeyPattern) -> usize {
        let matching: Vec<String> = self
            .index
            .keys()
            .filter(|key| pattern.matches(key))
            .cloned()
            .collect();

        self.remove_keys(matching)
    }

    // Full scan: a recently promoted short-TTL entry can sit anywhere in the list.
    fn purge_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let expired: Vec<String> = self
            .index
            .iter()
            .filter(|(_, idx)| {
                self.list
                    .entry(**idx)
                    .map_or(true, |entry| entry.is_expired_at(now))
            })
            .map(|(key, _)| key.clone())
            .collect();

        let removed = self.remove_keys(expired);
        self.stats.record_expirations(removed);
        removed
    }

    fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.index.len());
        stats
    }

    fn max_size(&self) -> usize {
        self.max_size
    }
}
