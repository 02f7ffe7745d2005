//! Response DTOs for the cache admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheControl, CacheEntry, CacheStats, StrategyKind};

/// Formats a Unix millisecond timestamp as RFC 3339.
fn rfc3339(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

/// Response body for a cache read (GET /cache/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: Value,
    pub created_at: String,
    pub expires_at: String,
    #[serde(rename = "cacheControl", skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<CacheControl>,
}

impl GetResponse {
    pub fn from_entry(entry: CacheEntry<Value>) -> Self {
        Self {
            created_at: rfc3339(entry.created_at),
            expires_at: rfc3339(entry.expires_at),
            key: entry.key,
            value: entry.value,
            cache_control: entry.cache_control,
        }
    }
}

/// Response body for a cache write (PUT /cache)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    pub message: String,
    pub key: String,
    /// False when caching is disabled and nothing was stored
    pub stored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl SetResponse {
    pub fn stored(entry: &CacheEntry<Value>) -> Self {
        Self {
            message: format!("Key '{}' cached for {}s", entry.key, entry.ttl_seconds()),
            key: entry.key.clone(),
            stored: true,
            expires_at: Some(rfc3339(entry.expires_at)),
        }
    }

    pub fn skipped(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Caching disabled, key '{}' not stored", key),
            key,
            stored: false,
            expires_at: None,
        }
    }
}

/// Response body for a delete (DELETE /cache/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for clearing the cache (DELETE /cache)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

impl ClearResponse {
    pub fn new() -> Self {
        Self {
            message: "Cache cleared".to_string(),
        }
    }
}

impl Default for ClearResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Response body for any invalidation endpoint
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Number of entries removed
    pub removed: usize,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub sets: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    pub enabled: bool,
    pub strategy: StrategyKind,
    pub max_size: usize,
    pub default_ttl: u64,
}

impl StatsResponse {
    pub fn new(
        stats: &CacheStats,
        enabled: bool,
        strategy: StrategyKind,
        max_size: usize,
        default_ttl: u64,
    ) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            sets: stats.sets,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
            enabled,
            strategy,
            max_size,
            default_ttl,
        }
    }
}

/// Response body for the settings endpoint (PUT /settings)
#[derive(Debug, Clone, Serialize)]
pub struct SettingsResponse {
    pub enabled: bool,
    pub default_ttl: u64,
    pub resource_ttls: HashMap<String, u64>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
