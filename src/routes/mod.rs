//! HTTP routes and middleware stack.
//!
//! Every request passes the canonical host check before it reaches a route, so a
//! client on the wrong authority is redirected even for paths that do not exist.
//! Request tracing wraps both, giving redirects a request_id in the logs.

pub mod health;

use axum::{http::Uri, middleware, routing::get, Router};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::CACHE_CONTROL_HEALTH;
use crate::error::AppError;
use crate::middleware::{canonical_host_layer, request_id_layer};
use crate::state::AppState;

/// Fallback for anything not routed here.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// Creates the Axum router with the canonical host layer applied.
pub fn create_router(state: AppState) -> Router {
    // Health check - no caching, always fresh for liveness probes
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_HEALTH),
        ));

    Router::new()
        .merge(health_routes)
        .fallback(not_found)
        .with_state(state.clone())
        // Canonical host check - redirects before any route runs
        .layer(middleware::from_fn_with_state(state, canonical_host_layer))
        // HTTP-level tracing (tower_http target), nested in the request span
        .layer(TraceLayer::new_for_http())
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
