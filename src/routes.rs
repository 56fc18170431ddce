//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`              - Short link redirect (public)
//! - `GET  /ping`                - Storage liveness (public)
//! - `GET  /api/internal/stats`  - Statistics (trusted subnet only)
//! - everything else             - Owner routes, see [`crate::api::routes`]
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Gzip** - Request decompression and response compression
//! - **Owner identity** - Cookie or Bearer token, issued on demand
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{ping_handler, redirect_handler, stats_handler};
use crate::api::middleware::{auth, compression, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds the router with all routes and middleware, without path
/// normalization.
pub fn api_router(state: AppState) -> Router {
    let owner_router = api::routes::owner_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    Router::new()
        .merge(owner_router)
        .route("/ping", get(ping_handler))
        .route("/api/internal/stats", get(stats_handler))
        .route("/{code}", get(redirect_handler))
        .with_state(state)
        .layer(compression::response_layer())
        .layer(compression::request_layer())
        .layer(tracing::layer())
}

/// Constructs the application router, trimming trailing slashes before routing.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(api_router(state))
}
