//! Material handlers
//!
//! Every endpoint answers 200 with a JSON body on success.

use axum::{
    extract::{Query, State},
    Json,
};
use materials_service::dto::{
    EditMaterialRequest, EmptyResponse, ListMaterialsQuery, MaterialListResponse,
    MaterialRefRequest, MaterialResponse, MaterialUuidRequest, SaveDraftMaterialRequest,
    SaveDraftMaterialResponse, ToggleLikeResponse,
};
use materials_service::MaterialService;

use crate::extractors::{Ctx, JsonBody};
use crate::response::ApiResult;
use crate::state::AppState;

/// Save a new draft
///
/// POST /api/materials/save-draft-material
pub async fn save_draft_material(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    JsonBody(request): JsonBody<SaveDraftMaterialRequest>,
) -> ApiResult<Json<SaveDraftMaterialResponse>> {
    let service = MaterialService::new(state.service_context());
    let response = service.save_draft(&ctx, request).await?;
    Ok(Json(response))
}

/// Publish a draft
///
/// POST /api/materials/publish-material
pub async fn publish_material(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    JsonBody(request): JsonBody<MaterialUuidRequest>,
) -> ApiResult<Json<MaterialResponse>> {
    let service = MaterialService::new(state.service_context());
    let response = service.publish_material(&ctx, request).await?;
    Ok(Json(response))
}

/// Replace the editable fields
///
/// POST /api/materials/edit-material
pub async fn edit_material(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    JsonBody(request): JsonBody<EditMaterialRequest>,
) -> ApiResult<Json<MaterialResponse>> {
    let service = MaterialService::new(state.service_context());
    let response = service.edit_material(&ctx, request).await?;
    Ok(Json(response))
}

/// Like or unlike
///
/// POST /api/materials/toggle-like
pub async fn toggle_like(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    JsonBody(request): JsonBody<MaterialRefRequest>,
) -> ApiResult<Json<ToggleLikeResponse>> {
    let service = MaterialService::new(state.service_context());
    let response = service.toggle_like(&ctx, request).await?;
    Ok(Json(response))
}

/// POST /api/materials/archived-material
pub async fn archive_material(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    JsonBody(request): JsonBody<MaterialUuidRequest>,
) -> ApiResult<Json<EmptyResponse>> {
    let service = MaterialService::new(state.service_context());
    let response = service.archive_material(&ctx, request).await?;
    Ok(Json(response))
}

/// POST /api/materials/delete-material
pub async fn delete_material(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    JsonBody(request): JsonBody<MaterialUuidRequest>,
) -> ApiResult<Json<EmptyResponse>> {
    let service = MaterialService::new(state.service_context());
    let response = service.delete_material(&ctx, request).await?;
    Ok(Json(response))
}

/// Page through live materials. Unparseable `page`/`limit` fall back to
/// their defaults instead of failing the request.
///
/// GET /api/materials?page=&limit=
pub async fn get_all_materials(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    query: Option<Query<ListMaterialsQuery>>,
) -> ApiResult<Json<MaterialListResponse>> {
    let pagination = query.map(|Query(q)| q.pagination()).unwrap_or_default();

    let service = MaterialService::new(state.service_context());
    let response = service.get_all_materials(&ctx, pagination).await?;
    Ok(Json(response))
}

/// POST /api/materials/get-material
pub async fn get_material(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    JsonBody(request): JsonBody<MaterialRefRequest>,
) -> ApiResult<Json<MaterialResponse>> {
    let service = MaterialService::new(state.service_context());
    let response = service.get_material(&ctx, request).await?;
    Ok(Json(response))
}
