//! API Routes
//!
//! Configures the Axum router with all service endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cleanup_handler, health_handler, invalidate_handler, nearby_handler, stats_handler, AppState,
};
use crate::cache::Clock;
use crate::service::RequestSource;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /requests/nearby` - Pending requests around a location
/// - `DELETE /cache` - Invalidate one cell or flush the cache
/// - `POST /cache/cleanup` - Run an expiry sweep now
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router<S, C>(state: AppState<S, C>) -> Router
where
    S: RequestSource + 'static,
    C: Clock + 'static,
{
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/requests/nearby", get(nearby_handler::<S, C>))
        .route("/cache", delete(invalidate_handler::<S, C>))
        .route("/cache/cleanup", post(cleanup_handler::<S, C>))
        .route("/stats", get(stats_handler::<S, C>))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
