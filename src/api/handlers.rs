//! API Handlers
//!
//! HTTP request handlers for each service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use tokio::sync::RwLock;

use crate::cache::{Clock, LocationCache, SystemClock};
use crate::config::Config;
use crate::error::{Result, ServiceError};
use crate::models::{
    CleanupResponse, HealthResponse, InvalidateQuery, InvalidateResponse, LocationQuery,
    NearbyResponse, StatsResponse,
};
use crate::service::{NearbyRequests, RequestSource};

/// Application state shared across all handlers.
pub struct AppState<S, C = SystemClock> {
    /// Fetch-through service over the shared cache
    pub nearby: NearbyRequests<S, C>,
}

impl<S, C> Clone for AppState<S, C> {
    fn clone(&self) -> Self {
        Self {
            nearby: self.nearby.clone(),
        }
    }
}

impl<S: RequestSource, C: Clock> AppState<S, C> {
    /// Creates a new AppState around an existing service.
    pub fn new(nearby: NearbyRequests<S, C>) -> Self {
        Self { nearby }
    }
}

impl<S: RequestSource> AppState<S, SystemClock> {
    /// Creates a new AppState from configuration.
    ///
    /// Builds a fresh cache with the configured knobs in front of `source`.
    pub fn from_config(config: &Config, source: S) -> Self {
        let cache = Arc::new(RwLock::new(LocationCache::new(config.cache.clone())));
        Self::new(NearbyRequests::new(cache, source, config.upstream_timeout_ms))
    }
}

/// Handler for GET /requests/nearby?latitude=..&longitude=..
pub async fn nearby_handler<S, C>(
    State(state): State<AppState<S, C>>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<NearbyResponse>>
where
    S: RequestSource,
    C: Clock,
{
    let lookup = state.nearby.nearby(query.latitude, query.longitude).await?;
    Ok(Json(lookup.into()))
}

/// Handler for DELETE /cache
///
/// With `latitude` and `longitude` only that cell is dropped; without
/// them the whole cache is flushed.
pub async fn invalidate_handler<S, C>(
    State(state): State<AppState<S, C>>,
    Query(query): Query<InvalidateQuery>,
) -> Result<Json<InvalidateResponse>>
where
    S: RequestSource,
    C: Clock,
{
    if let Some(error_msg) = query.validate() {
        return Err(ServiceError::InvalidRequest(error_msg));
    }

    let location = query.location();
    let removed = state.nearby.invalidate(location).await;

    Ok(Json(InvalidateResponse::new(removed, location.is_some())))
}

/// Handler for POST /cache/cleanup
pub async fn cleanup_handler<S, C>(State(state): State<AppState<S, C>>) -> Json<CleanupResponse>
where
    S: RequestSource,
    C: Clock,
{
    let removed = state.nearby.cleanup().await;
    Json(CleanupResponse { removed })
}

/// Handler for GET /stats
pub async fn stats_handler<S, C>(State(state): State<AppState<S, C>>) -> Json<StatsResponse>
where
    S: RequestSource,
    C: Clock,
{
    // Acquire read lock for a consistent snapshot
    let cache = state.nearby.cache().read().await;
    Json(StatsResponse::new(cache.stats(), cache.config()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
