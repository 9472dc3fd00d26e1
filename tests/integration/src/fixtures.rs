//! Test fixtures and data generators
//!
//! Request bodies the service accepts; responses reuse the service DTOs.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

pub use materials_service::dto::{
    EmptyResponse, MaterialListResponse, MaterialResponse, MaterialView,
    SaveDraftMaterialResponse, ToggleLikeResponse,
};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

pub mod paths {
    pub const SAVE_DRAFT: &str = "/api/materials/save-draft-material";
    pub const PUBLISH: &str = "/api/materials/publish-material";
    pub const EDIT: &str = "/api/materials/edit-material";
    pub const TOGGLE_LIKE: &str = "/api/materials/toggle-like";
    pub const ARCHIVE: &str = "/api/materials/archived-material";
    pub const DELETE: &str = "/api/materials/delete-material";
    pub const GET: &str = "/api/materials/get-material";
    pub const LIST: &str = "/api/materials";
}

/// Save-draft request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRequest {
    pub title: String,
    pub content: Option<String>,
    pub description: String,
    pub cover_image_url: String,
    pub read_time_minutes: i32,
}

impl DraftRequest {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            title: format!("Material {suffix}"),
            content: Some(format!("Body of material {suffix}")),
            description: "Integration test material".to_string(),
            cover_image_url: format!("https://cdn.example.com/{suffix}.png"),
            read_time_minutes: 5,
        }
    }
}

/// Edit request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    pub uuid: String,
    pub title: String,
    pub content: Option<String>,
    pub description: String,
    pub cover_image_url: String,
    pub read_time_minutes: i32,
}

impl EditRequest {
    pub fn from_draft(uuid: &str, draft: &DraftRequest) -> Self {
        Self {
            uuid: uuid.to_string(),
            title: draft.title.clone(),
            content: draft.content.clone(),
            description: draft.description.clone(),
            cover_image_url: draft.cover_image_url.clone(),
            read_time_minutes: draft.read_time_minutes,
        }
    }
}

/// `{uuid}` body of publish, archive and delete
#[derive(Debug, Clone, Serialize)]
pub struct UuidRequest {
    pub uuid: String,
}

impl UuidRequest {
    pub fn new(uuid: &str) -> Self {
        Self {
            uuid: uuid.to_string(),
        }
    }
}

/// `{materialUuid}` body of get and toggle-like
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRef {
    pub material_uuid: String,
}

impl MaterialRef {
    pub fn new(uuid: &str) -> Self {
        Self {
            material_uuid: uuid.to_string(),
        }
    }
}
