//! Request middleware: request correlation and canonical host enforcement.
//!
//! `request_id_layer` generates a UUID v4 for each incoming request and opens a
//! tracing span around the whole request lifecycle, so every log line emitted while
//! handling the request carries the request_id field.
//!
//! `canonical_host_layer` runs before any routing and short-circuits with a
//! `301 Moved Permanently` when the request arrived on a host other than the
//! canonical one.

use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::header::HOST,
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::http::redirect::{decide, redirect_response, redirect_url, RedirectOutcome};
use crate::state::AppState;

/// Extension type for accessing request ID in handlers if needed.
#[derive(Clone, Debug)]
pub struct RequestId(pub Uuid);

/// Authority the request was addressed to.
///
/// Prefers the Host header; HTTP/2 requests carry it in the URI authority instead.
/// Returns an empty string when neither is present.
pub fn request_host(request: &Request) -> &str {
    request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| request.uri().authority().map(|authority| authority.as_str()))
        .unwrap_or("")
}

/// Middleware that generates a request ID and creates a request span.
///
/// This should be the outermost middleware layer so the span wraps
/// all request processing, including redirects.
pub async fn request_id_layer(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        host = %request_host(&request),
        path = %request.uri().path(),
        duration_ms = tracing::field::Empty,
    );

    let start = Instant::now();

    let mut request = request;
    request.extensions_mut().insert(RequestId(request_id));

    async move {
        let response = next.run(request).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::Span::current().record("duration_ms", duration_ms);
        tracing::info!(
            status = response.status().as_u16(),
            duration_ms,
            "Request completed"
        );

        response
    }
    .instrument(span)
    .await
}

/// Middleware that redirects requests to the canonical host.
///
/// When the request is redirected the inner service is never called.
pub async fn canonical_host_layer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let canonical_host = state.provider.canonical_host();

    let target = match decide(request_host(&request), &canonical_host) {
        RedirectOutcome::NoRedirect => return next.run(request).await,
        RedirectOutcome::RedirectTo(target) => target,
    };

    let location = redirect_url(&target);
    match redirect_response(&location) {
        Ok(response) => {
            tracing::debug!(
                from = %request_host(&request),
                to = %location,
                "Redirecting to canonical host"
            );
            response
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                canonical_host = %target,
                "Canonical host is not a valid Location header, skipping redirect"
            );
            next.run(request).await
        }
    }
}
