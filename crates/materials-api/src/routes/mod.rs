//! Route definitions
//!
//! Material endpoints run through the request pipeline; health and metrics
//! routes are mounted beside it without authentication.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{health, materials, metrics};
use crate::middleware::apply_pipeline;
use crate::state::AppState;


/// Create the HTTP router with all routes and the request pipeline
pub fn create_router(state: AppState) -> Router {
    let api = apply_pipeline(material_routes(), &state);

    Router::new()
        .merge(api)
        .merge(operational_routes())
        .with_state(state)
}

/// Health and metrics routes
pub fn operational_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/metrics", get(metrics::render_metrics))
}

/// Material routes
fn material_routes() -> Router<AppState> {
    Router::new()
        .route("/api/materials", get(materials::get_all_materials))
        .route(
            "/api/materials/save-draft-material",
            post(materials::save_draft_material),
        )
        .route(
            "/api/materials/publish-material",
            post(materials::publish_material),
        )
        .route("/api/materials/edit-material", post(materials::edit_material))
        .route("/api/materials/toggle-like", post(materials::toggle_like))
        .route(
            "/api/materials/archived-material",
            post(materials::archive_material),
        )
        .route(
            "/api/materials/delete-material",
            post(materials::delete_material),
        )
        .route("/api/materials/get-material", post(materials::get_material))
}
