//! API Handlers
//!
//! HTTP request handlers for the cache admin endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::CacheManager;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, DeleteResponse, GetResponse, HealthResponse, InvalidateRequest,
    InvalidateResponse, SetRequest, SetResponse, SettingsRequest, SettingsResponse, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared response cache
    pub cache: Arc<CacheManager>,
}

impl AppState {
    pub fn new(cache: Arc<CacheManager>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(CacheManager::from_config(config)))
    }
}

/// Handler for PUT /cache
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let options = req.options();
    let response = match state
        .cache
        .set(&req.key, req.value, req.resource.as_deref(), &options)
    {
        Some(entry) => SetResponse::stored(&entry),
        None => SetResponse::skipped(req.key),
    };

    Ok(Json(response))
}

/// Handler for GET /cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    state
        .cache
        .get_entry(&key)
        .map(|entry| Json(GetResponse::from_entry(entry)))
        .ok_or(CacheError::NotFound(key))
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if state.cache.delete(&key) {
        Ok(Json(DeleteResponse::new(key)))
    } else {
        Err(CacheError::NotFound(key))
    }
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.clear();
    Json(ClearResponse::new())
}

/// Handler for POST /invalidate
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if req.pattern.is_empty() {
        return Err(CacheError::InvalidRequest(
            "Pattern cannot be empty".to_string(),
        ));
    }

    let removed = if req.regex {
        state.cache.invalidate_regex(&req.pattern)?
    } else {
        state.cache.invalidate(req.pattern)
    };

    Ok(Json(InvalidateResponse { removed }))
}

/// Handler for DELETE /resources/:resource
pub async fn invalidate_resource_handler(
    State(state): State<AppState>,
    Path(resource): Path<String>,
) -> Json<InvalidateResponse> {
    let removed = state.cache.invalidate_resource(&resource);
    Json(InvalidateResponse { removed })
}

/// Handler for DELETE /resources/:resource/:id
pub async fn invalidate_resource_by_id_handler(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> Json<InvalidateResponse> {
    let removed = state.cache.invalidate_resource_by_id(&resource, &id);
    Json(InvalidateResponse { removed })
}

/// Handler for PUT /settings
pub async fn settings_handler(
    State(state): State<AppState>,
    Json(req): Json<SettingsRequest>,
) -> Json<SettingsResponse> {
    let cache = &state.cache;

    if let Some(enabled) = req.enabled {
        cache.set_enabled(enabled);
    }
    if let Some(ttl) = req.default_ttl {
        cache.set_default_ttl(ttl);
    }
    for (resource, ttl) in req.resource_ttls.unwrap_or_default() {
        cache.set_resource_ttl(&resource, ttl);
    }

    Json(SettingsResponse {
        enabled: cache.is_enabled(),
        default_ttl: cache.default_ttl(),
        resource_ttls: cache.resource_ttls(),
    })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = &state.cache;

    Json(StatsResponse::new(
        &cache.stats(),
        cache.is_enabled(),
        cache.strategy(),
        cache.max_size(),
        cache.default_ttl(),
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> AppState {
        AppState::from_config(&Config::default())
    }

    fn set_request(key: &str, value: serde_json::Value) -> SetRequest {
        serde_json::from_value(json!({"key": key, "value": value})).unwrap()
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = state();

        let result = set_handler(
            State(state.clone()),
            Json(set_request("tags:/tags", json!(["virtual"]))),
        )
        .await;
        assert!(result.unwrap().stored);

        let response = get_handler(State(state), Path("tags:/tags".to_string()))
            .await
            .unwrap();
        assert_eq!(response.value, json!(["virtual"]));
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let result = get_handler(State(state()), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = state();
        set_handler(State(state.clone()), Json(set_request("to_delete", json!(1))))
            .await
            .unwrap();

        let result = delete_handler(State(state.clone()), Path("to_delete".to_string())).await;
        assert!(result.is_ok());

        let result = delete_handler(State(state), Path("to_delete".to_string())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_set_while_disabled_is_skipped() {
        let state = state();
        state.cache.set_enabled(false);

        let response = set_handler(State(state.clone()), Json(set_request("k", json!(1))))
            .await
            .unwrap();
        assert!(!response.stored);
        assert_eq!(state.cache.size(), 0);
    }

    #[tokio::test]
    async fn test_invalidate_handler_rejects_bad_regex() {
        let req = InvalidateRequest {
            pattern: "[".to_string(),
            regex: true,
        };
        let result = invalidate_handler(State(state()), Json(req)).await;
        assert!(matches!(result, Err(CacheError::InvalidPattern(_))));
    }

    #[tokio::test]
    async fn test_resource_invalidation_handlers() {
        let state = state();
        for key in ["subnets:/subnets", "subnets:/subnets:5", "subnets:/subnets:55"] {
            set_handler(State(state.clone()), Json(set_request(key, json!(null))))
                .await
                .unwrap();
        }

        let response = invalidate_resource_by_id_handler(
            State(state.clone()),
            Path(("subnets".to_string(), "5".to_string())),
        )
        .await;
        assert_eq!(response.removed, 1);

        let response =
            invalidate_resource_handler(State(state), Path("subnets".to_string())).await;
        assert_eq!(response.removed, 2);
    }

    #[tokio::test]
    async fn test_settings_handler() {
        let state = state();
        let req = SettingsRequest {
            enabled: Some(false),
            default_ttl: Some(42),
            resource_ttls: Some([("machines".to_string(), 15)].into_iter().collect()),
        };

        let response = settings_handler(State(state.clone()), Json(req)).await;
        assert!(!response.enabled);
        assert_eq!(response.default_ttl, 42);
        assert_eq!(state.cache.resource_ttl("machines"), 15);
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let response = stats_handler(State(state())).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 0);
        assert!(response.enabled);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
