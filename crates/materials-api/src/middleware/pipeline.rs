//! The per-request pipeline: auth → logging → metrics → tx.
//!
//! Each stage is a plain `axum::middleware` function; `apply_pipeline`
//! stacks them so that auth runs first and tx runs last before the handler.

use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::{from_fn, from_fn_with_state, Next},
    response::Response,
    Router,
};
use materials_common::Metrics;
use materials_core::DomainError;
use tracing::{error, info, info_span, warn, Instrument, Span};

use super::REQUEST_ID_HEADER;
use crate::extractors::{caller_from_headers, Caller};
use crate::response::ApiError;
use crate::state::AppState;

/// Routes that accept anonymous callers
fn is_public(method: &Method, path: &str) -> bool {
    let path = path.trim_end_matches('/');
    (*method == Method::GET && path == "/api/materials")
        || (*method == Method::POST && path == "/api/materials/get-material")
}

/// Wrap `router` in the request pipeline
pub fn apply_pipeline(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router
        .layer(from_fn_with_state(state.clone(), tx))
        .layer(from_fn_with_state(state.clone(), metrics))
        .layer(from_fn(logging))
        .layer(from_fn(auth))
}

/// Resolve the caller; reject anonymous calls to protected routes
pub async fn auth(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let caller = caller_from_headers(req.headers());

    if caller.is_none() && !is_public(req.method(), req.uri().path()) {
        warn!(
            method = %req.method(),
            path = %req.uri().path(),
            "Rejected request without caller identity"
        );
        return Err(DomainError::Unauthenticated.into());
    }

    req.extensions_mut().insert(Caller(caller));
    Ok(next.run(req).await)
}

/// Open the request span and log the outcome
pub async fn logging(req: Request, next: Next) -> Response {
    let caller = req
        .extensions()
        .get::<Caller>()
        .and_then(|c| c.0.as_ref())
        .map_or_else(|| "-".to_string(), ToString::to_string);
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let span = info_span!(
        "http_request",
        method = %req.method(),
        path = %req.uri().path(),
        caller = %caller,
        request_id = %request_id,
    );

    let start = Instant::now();
    let response = next.run(req).instrument(span.clone()).await;
    let latency_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    span.in_scope(|| {
        if status >= 500 {
            error!(status, latency_ms, "Request failed");
        } else if status >= 400 {
            warn!(status, latency_ms, "Request rejected");
        } else {
            info!(status, latency_ms, "Request completed");
        }
    });

    response
}

/// Count the request and its failures, observe its duration
pub async fn metrics(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let name = Metrics::metric_name(req.method().as_str(), req.uri().path());
    let start = Instant::now();

    let response = next.run(req).await;

    let failed = response.status().as_u16() >= 400;
    state
        .metrics()
        .observe_request(&name, start.elapsed(), failed);
    response
}

/// Install the `RequestContext` the handler runs with
pub async fn tx(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let caller = req.extensions().get::<Caller>().and_then(|c| c.0.clone());
    let ctx = state
        .service_context()
        .request_context(caller)
        .with_span(Span::current());

    req.extensions_mut().insert(ctx);
    next.run(req).await
}
