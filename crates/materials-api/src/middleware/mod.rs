//! Middleware stack for the API server
//!
//! The request pipeline lives in [`pipeline`]; this module adds the outer
//! layers shared by every HTTP route: request ids, the timeout backstop and
//! panic recovery.

mod pipeline;

use std::time::Duration;

use axum::{
    http::{header::HeaderName, StatusCode},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

pub use pipeline::{apply_pipeline, auth, logging, metrics, tx};

use crate::response::panic_response;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Slack between the per-request deadline and the HTTP timeout backstop
const BACKSTOP_GRACE: Duration = Duration::from_secs(5);

/// Apply the outer layers. The timeout only fires when a handler ignores
/// its own deadline; a panicking handler becomes a 500.
pub fn apply_middleware(router: Router, request_timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(
                HeaderName::from_static(REQUEST_ID_HEADER),
                MakeRequestUuid,
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                REQUEST_ID_HEADER,
            )))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::SERVICE_UNAVAILABLE,
                request_timeout + BACKSTOP_GRACE,
            ))
            .layer(CatchPanicLayer::custom(panic_response)),
    )
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request, routing::get};
    use materials_common::ErrorResponse;
    use tower::ServiceExt;

    use super::*;

    async fn explode() -> &'static str {
        panic!("handler exploded")
    }

    fn app() -> Router {
        let router = Router::new()
            .route("/ok", get(|| async { "ok" }))
            .route("/explode", get(explode));
        apply_middleware(router, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_panicking_handler_becomes_internal_error() {
        let response = app()
            .oneshot(Request::get("/explode").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, ErrorResponse::new(500, "internal server error"));

        // The stack keeps serving after a panic
        let response = app()
            .oneshot(Request::get("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
