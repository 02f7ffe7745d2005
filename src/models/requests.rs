//! Request DTOs for the cache admin API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::cache::{CacheControl, SetOptions};

/// Request body for storing a value (PUT /cache)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The JSON value to store
    pub value: Value,
    /// Resource name used for TTL lookup
    #[serde(default)]
    pub resource: Option<String>,
    /// Optional TTL in seconds, overriding resource and default TTLs
    #[serde(default)]
    pub ttl: Option<u64>,
    #[serde(default, rename = "cacheControl")]
    pub cache_control: Option<CacheControl>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if matches!(self.resource.as_deref(), Some("")) {
            return Some("Resource cannot be empty".to_string());
        }
        None
    }

    pub fn options(&self) -> SetOptions {
        SetOptions {
            ttl: self.ttl,
            enabled: None,
            cache_control: self.cache_control.clone(),
        }
    }
}

/// Request body for pattern invalidation (POST /invalidate)
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    /// Substring, or regular expression when `regex` is set
    pub pattern: String,
    #[serde(default)]
    pub regex: bool,
}

/// Request body for runtime reconfiguration (PUT /settings)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsRequest {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub default_ttl: Option<u64>,
    /// Resource TTLs to add or replace
    #[serde(default)]
    pub resource_ttls: Option<HashMap<String, u64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_request_deserialize() {
        let json = r#"{"key": "machines:/machines", "value": [{"system_id": "abc"}]}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, "machines:/machines");
        assert!(req.value.is_array());
        assert!(req.ttl.is_none());
        assert!(req.resource.is_none());
    }

    #[test]
    fn test_set_request_options() {
        let json = r#"{"key": "k", "value": 1, "resource": "zones", "ttl": 60,
                       "cacheControl": {"maxAge": 60, "immutable": true}}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        let options = req.options();
        assert_eq!(options.ttl, Some(60));
        assert_eq!(options.cache_control.map(|c| c.immutable), Some(true));
    }

    #[test]
    fn test_validate_empty_key() {
        let req: SetRequest = serde_json::from_str(r#"{"key": "", "value": 1}"#).unwrap();
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_empty_resource() {
        let req: SetRequest =
            serde_json::from_str(r#"{"key": "k", "value": 1, "resource": ""}"#).unwrap();
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_invalidate_request_defaults_to_substring() {
        let req: InvalidateRequest = serde_json::from_str(r#"{"pattern": "tags"}"#).unwrap();
        assert!(!req.regex);
    }

    #[test]
    fn test_settings_request_partial() {
        let req: SettingsRequest = serde_json::from_str(r#"{"default_ttl": 30}"#).unwrap();
        assert_eq!(req.default_ttl, Some(30));
        assert!(req.enabled.is_none());
        assert!(req.resource_ttls.is_none());
    }
}
