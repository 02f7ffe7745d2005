//! Strategy Module
//!
//! The contract every eviction/expiry policy implements, plus the closed set
//! of policies a store can be built with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::{
    CacheControl, CacheEntry, CacheStats, KeyPattern, LruStrategy, SharedClock, TimeBasedStrategy,
};
use crate::error::CacheError;

// == Cache Strategy ==
/// Storage and expiry mechanics behind the cache manager.
///
/// Implementations never fail on hit/miss/expiry paths; absence is `None`.
pub trait CacheStrategy<V: Clone> {
    /// Returns the live entry for `key`, removing it first if it has expired.
    fn get(&mut self, key: &str) -> Option<CacheEntry<V>>;

    /// Stores `value` under `key`, replacing any existing entry.
    fn set(
        &mut self,
        key: &str,
        value: V,
        ttl_seconds: u64,
        cache_control: Option<CacheControl>,
    ) -> CacheEntry<V>;

    /// Removes `key`. Returns true if an entry was removed.
    fn delete(&mut self, key: &str) -> bool;

    fn clear(&mut self);

    /// Number of stored entries, including expired ones not yet reclaimed.
    fn size(&self) -> usize;

    /// Removes every entry whose key matches `pattern`. Returns the count.
    fn invalidate(&mut self, pattern: &KeyPattern) -> usize;

    /// Removes every expired entry. Returns the count. Run by the sweep.
    fn purge_expired(&mut self) -> usize;

    fn stats(&self) -> CacheStats;

    fn max_size(&self) -> usize;
}

// == Strategy Kind ==
/// Named eviction policy, as selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Lazy + swept expiry, capacity overflow drops the oldest insertion
    #[default]
    #[serde(rename = "time-based")]
    TimeBased,
    /// Lazy + swept expiry, capacity overflow drops the least recently used
    #[serde(rename = "lru")]
    Lru,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::TimeBased => "time-based",
            StrategyKind::Lru => "lru",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "time-based" => Ok(StrategyKind::TimeBased),
            "lru" => Ok(StrategyKind::Lru),
            other => Err(CacheError::Config(format!(
                "unknown cache strategy '{}', expected 'lru' or 'time-based'",
                other
            ))),
        }
    }
}

// == Strategy ==
/// A concrete strategy, resolved once from a [`StrategyKind`].
#[derive(Debug)]
pub enum Strategy<V> {
    TimeBased(TimeBasedStrategy<V>),
    Lru(LruStrategy<V>),
}

impl<V: Clone> Strategy<V> {
    pub fn new(kind: StrategyKind, max_size: usize, clock: SharedClock) -> Self {
        match kind {
            StrategyKind::TimeBased => Strategy::TimeBased(TimeBasedStrategy::new(max_size, clock)),
            StrategyKind::Lru => Strategy::Lru(LruStrategy::new(max_size, clock)),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::TimeBased(_) => StrategyKind::TimeBased,
            Strategy::Lru(_) => StrategyKind::Lru,
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $s:ident => $call:expr) => {
        match $self {
            Strategy::TimeBased($s) => $call,
            Strategy::Lru($s) => $call,
        }
    };
}

impl<V: Clone> CacheStrategy<V> for Strategy<V> {
    fn get(&mut self, key: &str) -> Option<CacheEntry<V>> {
        dispatch!(self, s => s.get(key))
    }

    fn set(
        &mut self,
        key: &str,
        value: V,
        ttl_seconds: u64,
        cache_control: Option<CacheControl>,
    ) -> CacheEntry<V> {
        dispatch!(self, s => s.set(key, value, ttl_seconds, cache_control))
    }

    fn delete(&mut self, key: &str) -> bool {
        dispatch!(self, s => s.delete(key))
    }

    fn clear(&mut self) {
        dispatch!(self, s => s.clear())
    }

    fn size(&self) -> usize {
        dispatch!(self, s => s.size())
    }

    fn invalidate(&mut self, pattern: &KeyPattern) -> usize {
        dispatch!(self, s => s.invalidate(pattern))
    }

    fn purge_expired(&mut self) -> usize {
        dispatch!(self, s => s.purge_expired())
    }

    fn stats(&self) -> CacheStats {
        dispatch!(self, s => s.stats())
    }

    fn max_size(&self) -> usize {
        dispatch!(self, s => s.max_size())
    }
}
