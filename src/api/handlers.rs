//! API Handlers
//!
//! HTTP request handlers for each memoization endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, Json};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::cache::{CacheKey, CacheStats, CacheStore, EntryMetadata, ImportReport, Snapshot};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, GetResponse, HealthResponse, LookupRequest, SetRequest, SetResponse,
};

/// Application state shared across all handlers.
///
/// One lock guards the whole store. Lookups take the write lock because a
/// hit updates recency and counters.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<RwLock<CacheStore<Value>>>,
}

impl AppState {
    /// Creates a new AppState with the given cache store.
    pub fn new(cache: CacheStore<Value>) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(CacheStore::new(config.capacity, config.default_ttl()))
    }
}

/// Handler for POST /get
///
/// Returns the memoized response for a request, 404 on a miss.
pub async fn get_handler(
    State(state): State<AppState>,
    Json(req): Json<LookupRequest>,
) -> Result<Json<GetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let key = CacheKey::derive(&req.prompt, &req.model, req.options.as_ref());
    let value = state
        .cache
        .write()
        .await
        .get(&req.prompt, &req.model, req.options.as_ref())
        .ok_or_else(|| CacheError::NotFound(key.to_string()))?;

    Ok(Json(GetResponse::new(key.to_string(), value)))
}

/// Handler for PUT /set
///
/// Memoizes a response with optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl_ms.map(Duration::from_millis);
    let key = state.cache.write().await.set(
        &req.prompt,
        req.value,
        &req.model,
        req.options.as_ref(),
        ttl,
    );

    Ok(Json(SetResponse::new(key.to_string())))
}

/// Handler for POST /metadata
///
/// Inspects an entry without counting a hit or refreshing it.
pub async fn metadata_handler(
    State(state): State<AppState>,
    Json(req): Json<LookupRequest>,
) -> Result<Json<EntryMetadata>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let metadata = state
        .cache
        .read()
        .await
        .metadata(&req.prompt, &req.model, req.options.as_ref())
        .ok_or_else(|| {
            CacheError::NotFound(
                CacheKey::derive(&req.prompt, &req.model, req.options.as_ref()).to_string(),
            )
        })?;

    Ok(Json(metadata))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.read().await.stats())
}

/// Handler for DELETE /clear
///
/// Drops every entry; counters survive.
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let mut cache = state.cache.write().await;
    let removed = cache.len();
    cache.clear();

    Json(ClearResponse::new(removed))
}

/// Handler for GET /export
pub async fn export_handler(State(state): State<AppState>) -> Json<Snapshot<Value>> {
    Json(state.cache.read().await.export())
}

/// Handler for POST /import
///
/// A version mismatch is reported in the body, not as an HTTP error.
pub async fn import_handler(
    State(state): State<AppState>,
    Json(snapshot): Json<Snapshot<Value>>,
) -> Json<ImportReport> {
    Json(state.cache.write().await.import(snapshot))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
