//! Infra Cache - in-process response cache for resource handlers
//!
//! Caches JSON responses under keys derived from resource name, URI path,
//! resource id and query parameters. Two interchangeable eviction strategies
//! (insertion-ordered TTL and LRU) sit behind a single manager that also
//! handles runtime toggles, per-resource TTLs and pattern invalidation.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::{CacheManager, CacheSettings, KeyOptions, KeyPattern, SetOptions, StrategyKind};
pub use config::Config;
pub use error::{CacheError, Result};
