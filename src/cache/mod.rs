//! Cache Module
//!
//! In-process response caching with TTL expiry and two eviction strategies:
//! time-based (oldest insertion first) and LRU.

mod clock;
mod entry;
mod key;
mod lru;
mod manager;
mod pattern;
mod stats;
mod store;
mod strategy;
mod time_based;

pub mod global;


// Re-export public types
pub use clock::{system_clock, Clock, ManualClock, SharedClock, SystemClock};
pub use entry::{CacheControl, CacheEntry};
pub use key::{extract_resource_id, generate_key, KeyGenerator, KeyOptions, QueryParams, ID_PARAMS};
pub use lru::LruStrategy;
pub use manager::{CacheManager, CacheSettings, SetOptions};
pub use pattern::KeyPattern;
pub use stats::CacheStats;
pub use store::{CacheStore, DEFAULT_SWEEP_INTERVAL};
pub use strategy::{CacheStrategy, Strategy, StrategyKind};
pub use time_based::TimeBasedStrategy;
