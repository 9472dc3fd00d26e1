//! Prometheus exposition

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::state::AppState;

const TEXT_FORMAT: &str = "text/plain; version=0.0.4";

/// GET /metrics
pub async fn render_metrics(State(state): State<AppState>) -> Response {
    match state.metrics().render() {
        Ok(body) => ([(header::CONTENT_TYPE, TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
