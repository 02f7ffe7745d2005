//! Configuration Module
//!
//! Handles loading cache and server configuration from environment variables.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;

use tracing::warn;

use crate::cache::StrategyKind;

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Whether responses are cached at all
    pub cache_enabled: bool,
    /// Eviction policy
    pub cache_strategy: StrategyKind,
    /// Maximum number of entries the cache can hold
    pub cache_max_size: usize,
    /// Default TTL in seconds
    pub cache_max_age: u64,
    /// Per-resource TTL overrides in seconds
    pub cache_resource_specific_ttl: HashMap<String, u64>,
    /// Background expiry sweep interval in seconds
    pub cache_sweep_interval: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_ENABLED` - Enable caching (default: true)
    /// - `CACHE_STRATEGY` - `lru` or `time-based` (default: time-based)
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: 1000)
    /// - `CACHE_MAX_AGE` - Default TTL in seconds (default: 300)
    /// - `CACHE_RESOURCE_SPECIFIC_TTL` - JSON object of resource to seconds,
    ///   e.g. `{"machines": 60, "zones": 3600}` (default: empty)
    /// - `CACHE_SWEEP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    ///
    /// Unparseable values fall back to their defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let cache_resource_specific_ttl = match lookup("CACHE_RESOURCE_SPECIFIC_TTL") {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!("Ignoring CACHE_RESOURCE_SPECIFIC_TTL='{}': {}", raw, err);
                defaults.cache_resource_specific_ttl.clone()
            }),
            None => defaults.cache_resource_specific_ttl.clone(),
        };

        Self {
            cache_enabled: parse_var(&lookup, "CACHE_ENABLED", defaults.cache_enabled),
            cache_strategy: parse_var(&lookup, "CACHE_STRATEGY", defaults.cache_strategy),
            cache_max_size: parse_var(&lookup, "CACHE_MAX_SIZE", defaults.cache_max_size),
            cache_max_age: parse_var(&lookup, "CACHE_MAX_AGE", defaults.cache_max_age),
            cache_resource_specific_ttl,
            cache_sweep_interval: parse_var(
                &lookup,
                "CACHE_SWEEP_INTERVAL",
                defaults.cache_sweep_interval,
            ),
            server_port: parse_var(&lookup, "SERVER_PORT", defaults.server_port),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_strategy: StrategyKind::TimeBased,
            cache_max_size: 1000,
            cache_max_age: 300,
            cache_resource_specific_ttl: HashMap::new(),
            cache_sweep_interval: 60,
            server_port: 3000,
        }
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|err| {
            warn!("Ignoring {}='{}': {}", name, raw, err);
            default
        }),
        None => default,
    }
}
