//! API Module
//!
//! HTTP handlers and routing for the pending-requests service.
//!
//! # Endpoints
//! - `GET /requests/nearby` - Pending requests around a location
//! - `DELETE /cache` - Invalidate one cell or flush the cache
//! - `POST /cache/cleanup` - Run an expiry sweep now
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
