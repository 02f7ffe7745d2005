//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use serde::{Deserialize, Serialize};

// == Cache Control ==
/// Cache-control metadata carried alongside a cached response.
///
/// Stored and returned as-is; the cache never interprets these fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheControl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub must_revalidate: bool,
    #[serde(default)]
    pub immutable: bool,
}

// == Cache Entry ==
/// A single cached value and its lifetime metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// Key the entry was stored under
    pub key: String,
    /// Optional passthrough cache-control metadata
    pub cache_control: Option<CacheControl>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry stamped at `now_ms` that lives `ttl_seconds`.
    pub fn new(
        key: impl Into<String>,
        value: V,
        ttl_seconds: u64,
        now_ms: u64,
        cache_control: Option<CacheControl>,
    ) -> Self {
        Self {
            value,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_seconds.saturating_mul(1000)),
            key: key.into(),
            cache_control,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is expired at `now_ms`.
    ///
    /// An entry is expired once `expires_at <= now`, so a zero TTL entry is
    /// already gone on the next read.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        self.expires_at <= now_ms
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds at `now_ms` (0 once expired).
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at.saturating_sub(now_ms)
    }

    /// Returns remaining TTL in whole seconds at `now_ms`.
    pub fn ttl_remaining(&self, now_ms: u64) -> u64 {
        self.ttl_remaining_ms(now_ms) / 1000
    }

    /// Total lifetime the entry was created with, in seconds.
    pub fn ttl_seconds(&self) -> u64 {
        (self.expires_at - self.created_at) / 1000
    }
}
