//! Cache Manager Module
//!
//! The facade resource handlers use: key building, TTL resolution,
//! resource-scoped invalidation and the global enable switch, on top of one
//! [`CacheStore`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info};

use crate::cache::{
    generate_key, system_clock, CacheControl, CacheEntry, CacheStats, CacheStore, KeyOptions,
    KeyPattern, QueryParams, SharedClock, StrategyKind,
};
use crate::config::Config;
use crate::error::Result;

// == Cache Settings ==
/// Construction parameters for a [`CacheManager`].
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    pub enabled: bool,
    pub strategy: StrategyKind,
    pub max_size: usize,
    /// Default TTL in seconds
    pub default_ttl: u64,
    /// Per-resource TTL overrides in seconds
    pub resource_ttls: HashMap<String, u64>,
    pub sweep_interval: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for CacheSettings {
    fn from(config: &Config) -> Self {
        Self {
            enabled: config.cache_enabled,
            strategy: config.cache_strategy,
            max_size: config.cache_max_size,
            default_ttl: config.cache_max_age,
            resource_ttls: config.cache_resource_specific_ttl.clone(),
            sweep_interval: Duration::from_secs(config.cache_sweep_interval),
        }
    }
}

// == Set Options ==
/// Per-call options for [`CacheManager::set`].
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    /// Explicit TTL in seconds, overriding resource and default TTLs
    pub ttl: Option<u64>,
    /// `Some(false)` skips caching for this call
    pub enabled: Option<bool>,
    pub cache_control: Option<CacheControl>,
}

impl SetOptions {
    pub fn ttl(ttl: u64) -> Self {
        Self {
            ttl: Some(ttl),
            ..Self::default()
        }
    }

    pub fn skip() -> Self {
        Self {
            enabled: Some(false),
            ..Self::default()
        }
    }
}

// == Cache Manager ==
/// Response cache shared by resource handlers.
///
/// Created once per process and passed around by reference (usually an
/// `Arc`). All methods take `&self`.
#[derive(Debug)]
pub struct CacheManager<V = Value> {
    store: CacheStore<V>,
    enabled: AtomicBool,
    default_ttl: AtomicU64,
    resource_ttls: RwLock<HashMap<String, u64>>,
}

impl<V> CacheManager<V>
where
    V: Clone + Send + 'static,
{
    // == Constructor ==
    /// Creates a manager on the wall clock and starts its expiry sweep.
    pub fn new(settings: CacheSettings) -> Self {
        Self::with_clock(settings, system_clock())
    }

    /// Creates a manager with an explicit time source.
    pub fn with_clock(settings: CacheSettings, clock: SharedClock) -> Self {
        let store = CacheStore::with_sweep(
            settings.strategy,
            settings.max_size,
            clock,
            settings.sweep_interval,
        );

        info!(
            "Cache manager initialized: enabled={}, strategy={}, max_size={}, default_ttl={}s, resource_ttls={}",
            settings.enabled,
            settings.strategy,
            settings.max_size,
            settings.default_ttl,
            settings.resource_ttls.len()
        );

        Self {
            store,
            enabled: AtomicBool::new(settings.enabled),
            default_ttl: AtomicU64::new(settings.default_ttl),
            resource_ttls: RwLock::new(settings.resource_ttls),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(CacheSettings::from(config))
    }

    // == Generate Key ==
    /// Builds the cache key for a resource request. See [`generate_key`].
    pub fn generate_key(
        &self,
        resource: &str,
        uri_path: &str,
        params: &QueryParams,
        options: Option<&KeyOptions>,
    ) -> String {
        generate_key(resource, uri_path, params, options)
    }

    // == Get ==
    /// Returns the cached value, or `None` on miss, expiry or when disabled.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_entry(key).map(|entry| entry.value)
    }

    /// Like [`get`](Self::get) but returns the whole entry.
    pub fn get_entry(&self, key: &str) -> Option<CacheEntry<V>> {
        if !self.is_enabled() {
            return None;
        }

        let entry = self.store.get(key);
        debug!(
            "Cache {} for '{}'",
            if entry.is_some() { "hit" } else { "miss" },
            key
        );
        entry
    }

    // == Set ==
    /// Stores `value` under `key` and returns the stored entry.
    ///
    /// Returns `None` without touching the store when the manager is disabled
    /// or `options.enabled` is `Some(false)`.
    ///
    /// TTL precedence: `options.ttl`, then the resource TTL, then the default.
    pub fn set(
        &self,
        key: &str,
        value: V,
        resource: Option<&str>,
        options: &SetOptions,
    ) -> Option<CacheEntry<V>> {
        if !self.is_enabled() || options.enabled == Some(false) {
            return None;
        }

        let ttl = self.resolve_ttl(resource, options);
        let entry = self
            .store
            .set(key, value, ttl, options.cache_control.clone());
        debug!("Cached '{}' for {}s", key, ttl);
        Some(entry)
    }

    fn resolve_ttl(&self, resource: Option<&str>, options: &SetOptions) -> u64 {
        if let Some(ttl) = options.ttl {
            return ttl;
        }
        resource
            .and_then(|name| self.resource_ttls.read().get(name).copied())
            .unwrap_or_else(|| self.default_ttl())
    }

    // == Get Or Fetch ==
    /// Returns the cached value for `key`, or runs `fetch` and caches its result.
    ///
    /// Fetch errors are returned as-is and nothing is cached. Concurrent
    /// misses on the same key each run their own fetch; the last write wins.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: &str,
        resource: Option<&str>,
        options: &SetOptions,
        fetch: F,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = fetch().await?;
        self.set(key, value.clone(), resource, options);
        Ok(value)
    }

    // == Delete / Clear ==
    pub fn delete(&self, key: &str) -> bool {
        self.is_enabled() && self.store.delete(key)
    }

    pub fn clear(&self) {
        if self.is_enabled() {
            self.store.clear();
            info!("Cache cleared");
        }
    }

    // == Invalidate ==
    /// Removes every entry whose key matches `pattern`. A plain string is a
    /// substring match.
    pub fn invalidate(&self, pattern: impl Into<KeyPattern>) -> usize {
        if !self.is_enabled() {
            return 0;
        }
        self.store.invalidate(&pattern.into())
    }

    /// Compiles `pattern` as a regular expression and invalidates matches.
    ///
    /// A malformed pattern is an error even while the manager is disabled.
    pub fn invalidate_regex(&self, pattern: &str) -> Result<usize> {
        let pattern = KeyPattern::regex(pattern)?;
        Ok(self.invalidate(pattern))
    }

    /// Removes every key of `resource`.
    pub fn invalidate_resource(&self, resource: &str) -> usize {
        let removed = self.invalidate(KeyPattern::prefix(format!("{}:", resource)));
        info!("Invalidated {} cached '{}' entries", removed, resource);
        removed
    }

    /// Removes the keys of one resource instance.
    ///
    /// Matches `<resource>:<id>` and `<resource>:<segment>:<id>`, optionally
    /// followed by more segments or a query. The id must end on a segment
    /// boundary, so `id7` never matches `id78`, and it may itself contain `:`.
    /// An empty id matches nothing.
    pub fn invalidate_resource_by_id(&self, resource: &str, resource_id: &str) -> usize {
        let prefix = format!("{}:", resource);
        let id = resource_id.to_string();

        let pattern = KeyPattern::predicate(move |key| {
            if id.is_empty() {
                return false;
            }
            let Some(rest) = key.strip_prefix(prefix.as_str()) else {
                return false;
            };
            let path = rest.split('?').next().unwrap_or_default();

            starts_with_segment(path, &id)
                || path
                    .split_once(':')
                    .is_some_and(|(_, after)| starts_with_segment(after, &id))
        });

        let removed = self.invalidate(pattern);
        info!(
            "Invalidated {} cached entries for {} '{}'",
            removed, resource, resource_id
        );
        removed
    }

    // == Runtime Switches ==
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Gates future operations; existing entries are kept.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        info!("Cache {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl.load(Ordering::SeqCst)
    }

    pub fn set_default_ttl(&self, ttl: u64) {
        self.default_ttl.store(ttl, Ordering::SeqCst);
    }

    /// Resource-specific TTL, or the default TTL when none is configured.
    pub fn resource_ttl(&self, resource: &str) -> u64 {
        self.resource_ttls
            .read()
            .get(resource)
            .copied()
            .unwrap_or_else(|| self.default_ttl())
    }

    pub fn set_resource_ttl(&self, resource: &str, ttl: u64) {
        self.resource_ttls.write().insert(resource.to_string(), ttl);
    }

    /// Snapshot of the configured resource TTLs.
    pub fn resource_ttls(&self) -> HashMap<String, u64> {
        self.resource_ttls.read().clone()
    }

    // == Introspection ==
    pub fn size(&self) -> usize {
        self.store.size()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }

    pub fn strategy(&self) -> StrategyKind {
        self.store.kind()
    }

    pub fn max_size(&self) -> usize {
        self.store.max_size()
    }

    /// Runs one expiry pass immediately, outside the sweep schedule.
    pub fn purge_expired(&self) -> usize {
        self.store.purge_expired()
    }
}

impl<V> CacheManager<V> {
    // == Dispose ==
    /// Stops the store's background sweep. Idempotent.
    pub fn dispose(&self) {
        self.store.dispose();
    }
}

/// True when `path` begins with `id` followed by `:` or the end of the path.
fn starts_with_segment(path: &str, id: &str) -> bool {
    path.strip_prefix(id)
        .is_some_and(|tail| tail.is_empty() || tail.starts_with(':'))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::error::CacheError;
    use serde_json::json;

    fn settings(strategy: StrategyKind) -> CacheSettings {
        CacheSettings {
            enabled: true,
            strategy,
            max_size: 100,
            default_ttl: 100,
            resource_ttls: HashMap::from([("R".to_string(), 200)]),
            sweep_interval: Duration::from_secs(60),
        }
    }

    fn manager() -> (CacheManager<i32>, ManualClock) {
        let clock = ManualClock::new(1_000_000);
        let manager = CacheManager::with_clock(settings(StrategyKind::Lru), Arc::new(clock.clone()));
        (manager, clock)
    }

    #[test]
    fn test_get_unknown_key() {
        let (manager, _) = manager();
        assert_eq!(manager.get("nothing"), None);
    }

    #[test]
    fn test_set_then_get() {
        let (manager, clock) = manager();
        manager.set("k", 7, None, &SetOptions::default());

        clock.advance_secs(99);
        assert_eq!(manager.get("k"), Some(7));

        clock.advance_secs(1);
        assert_eq!(manager.get("k"), None);
    }

    #[test]
    fn test_ttl_precedence_explicit_override() {
        let (manager, _) = manager();
        let entry = manager.set("k", 1, Some("R"), &SetOptions::ttl(300)).unwrap();
        assert_eq!(entry.expires_at, entry.created_at + 300_000);
    }

    #[test]
    fn test_ttl_precedence_resource_specific() {
        let (manager, _) = manager();
        let entry = manager
            .set("k", 1, Some("R"), &SetOptions::default())
            .unwrap();
        assert_eq!(entry.expires_at, entry.created_at + 200_000);
    }

    #[test]
    fn test_ttl_precedence_default_for_unknown_resource() {
        let (manager, _) = manager();
        let entry = manager
            .set("k", 1, Some("unknown"), &SetOptions::default())
            .unwrap();
        assert_eq!(entry.ttl_seconds(), 100);

        let entry = manager.set("k2", 1, None, &SetOptions::default()).unwrap();
        assert_eq!(entry.ttl_seconds(), 100);
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let (manager, _) = manager();
        assert!(manager.set("k", 1, None, &SetOptions::ttl(0)).is_some());
        assert_eq!(manager.get("k"), None);
    }

    #[test]
    fn test_per_call_skip() {
        let (manager, _) = manager();
        assert!(manager.set("k", 1, None, &SetOptions::skip()).is_none());
        assert_eq!(manager.size(), 0);
    }

    #[test]
    fn test_disabled_manager_is_a_no_op() {
        let (manager, _) = manager();
        manager.set("old", 1, None, &SetOptions::default());

        manager.set_enabled(false);
        assert!(!manager.is_enabled());
        assert_eq!(manager.get("old"), None);
        assert!(manager.set("new", 2, None, &SetOptions::default()).is_none());
        assert!(!manager.delete("old"));
        manager.clear();
        assert_eq!(manager.invalidate("old"), 0);
        assert_eq!(manager.size(), 1);

        manager.set_enabled(true);
        assert_eq!(manager.get("old"), Some(1));
        assert_eq!(manager.get("new"), None);
    }

    #[test]
    fn test_delete_and_clear() {
        let (manager, _) = manager();
        manager.set("a", 1, None, &SetOptions::default());
        manager.set("b", 2, None, &SetOptions::default());

        assert!(manager.delete("a"));
        assert!(!manager.delete("a"));
        manager.clear();
        assert_eq!(manager.size(), 0);
    }

    #[test]
    fn test_invalidate_resource() {
        let (manager, _) = manager();
        for key in ["R:/r", "R:/r:1", "R:/r?limit=5", "S:/s", "RR:/rr"] {
            manager.set(key, 1, None, &SetOptions::default());
        }

        assert_eq!(manager.invalidate_resource("R"), 3);
        assert_eq!(manager.get("S:/s"), Some(1));
        assert_eq!(manager.get("RR:/rr"), Some(1));
    }

    #[test]
    fn test_invalidate_resource_by_id() {
        let (manager, _) = manager();
        let keys = [
            "R:/items:id7",
            "R:id7",
            "R:/items:id7?limit=5",
            "R:/items:id78",
            "R:/items:xid7",
            "S:/items:id7",
            "R:/items",
        ];
        for key in keys {
            manager.set(key, 1, None, &SetOptions::default());
        }

        assert_eq!(manager.invalidate_resource_by_id("R", "id7"), 3);
        assert_eq!(manager.get("R:/items:id78"), Some(1));
        assert_eq!(manager.get("R:/items:xid7"), Some(1));
        assert_eq!(manager.get("S:/items:id7"), Some(1));
        assert_eq!(manager.get("R:/items"), Some(1));
    }

    #[test]
    fn test_invalidate_resource_by_id_with_colon_in_id() {
        let (manager, _) = manager();
        let params = match json!({"name": "rack:1"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let key = manager.generate_key("zones", "/zones", &params, None);
        assert_eq!(key, "zones:/zones:rack:1");

        manager.set(&key, 1, None, &SetOptions::default());
        manager.set("zones:/zones:rack:10", 2, None, &SetOptions::default());
        manager.set("zones:/zones:rack", 3, None, &SetOptions::default());

        assert_eq!(manager.invalidate_resource_by_id("zones", "rack:1"), 1);
        assert_eq!(manager.get(&key), None);
        assert_eq!(manager.get("zones:/zones:rack:10"), Some(2));
        assert_eq!(manager.get("zones:/zones:rack"), Some(3));
        assert_eq!(manager.invalidate_resource_by_id("zones", ""), 0);
    }

    #[test]
    fn test_invalidate_regex() {
        let (manager, _) = manager();
        manager.set("machines:/machines:a1", 1, None, &SetOptions::default());
        manager.set("machines:/machines:b2", 2, None, &SetOptions::default());

        assert_eq!(manager.invalidate_regex(r":a\d$").unwrap(), 1);
        assert!(matches!(
            manager.invalidate_regex("("),
            Err(CacheError::InvalidPattern(_))
        ));

        manager.set_enabled(false);
        assert!(manager.invalidate_regex("[").is_err());
    }

    #[test]
    fn test_runtime_ttl_reconfiguration() {
        let (manager, _) = manager();
        assert_eq!(manager.resource_ttl("R"), 200);
        assert_eq!(manager.resource_ttl("other"), 100);

        manager.set_default_ttl(50);
        manager.set_resource_ttl("other", 10);
        assert_eq!(manager.default_ttl(), 50);
        assert_eq!(manager.resource_ttl("other"), 10);

        let entry = manager
            .set("k", 1, Some("other"), &SetOptions::default())
            .unwrap();
        assert_eq!(entry.ttl_seconds(), 10);
        assert_eq!(manager.resource_ttls().len(), 2);
    }

    #[test]
    fn test_generate_key_delegates() {
        let (manager, _) = manager();
        let params = match json!({"system_id": "abc"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        assert_eq!(
            manager.generate_key("machines", "/machines", &params, None),
            "machines:/machines:abc"
        );
    }

    #[test]
    fn test_cache_control_is_stored() {
        let (manager, _) = manager();
        let options = SetOptions {
            cache_control: Some(CacheControl {
                max_age: Some(60),
                ..CacheControl::default()
            }),
            ..SetOptions::default()
        };
        manager.set("k", 1, None, &options);

        let entry = manager.get_entry("k").unwrap();
        assert_eq!(entry.cache_control.and_then(|c| c.max_age), Some(60));
    }

    #[tokio::test]
    async fn test_get_or_fetch_caches_success() {
        let (manager, _) = manager();
        let mut calls = 0;

        let value: std::result::Result<i32, String> = manager
            .get_or_fetch("k", Some("R"), &SetOptions::default(), || {
                calls += 1;
                async { Ok(5) }
            })
            .await;
        assert_eq!(value, Ok(5));

        let value: std::result::Result<i32, String> = manager
            .get_or_fetch("k", Some("R"), &SetOptions::default(), || {
                calls += 1;
                async { Ok(6) }
            })
            .await;
        assert_eq!(value, Ok(5));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_get_or_fetch_does_not_cache_errors() {
        let (manager, _) = manager();

        let value: std::result::Result<i32, String> = manager
            .get_or_fetch("k", None, &SetOptions::default(), || async {
                Err("upstream unavailable".to_string())
            })
            .await;

        assert_eq!(value, Err("upstream unavailable".to_string()));
        assert_eq!(manager.size(), 0);
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            cache_strategy: StrategyKind::Lru,
            cache_max_size: 10,
            ..Config::default()
        };
        let manager: CacheManager = CacheManager::from_config(&config);
        assert_eq!(manager.strategy(), StrategyKind::Lru);
        assert_eq!(manager.max_size(), 10);
        assert_eq!(manager.default_ttl(), 300);
        manager.dispose();
    }
}
