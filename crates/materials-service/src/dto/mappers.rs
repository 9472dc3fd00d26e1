//! Entity to DTO mappers
//!
//! Implements `From` conversions between domain entities and DTOs.

use materials_core::entities::{Material, MaterialFields};

use super::requests::{EditMaterialRequest, SaveDraftMaterialRequest};
use super::responses::{MaterialListResponse, MaterialResponse, MaterialView};

// ============================================================================
// Material Mappers
// ============================================================================

impl From<&Material> for MaterialView {
    fn from(material: &Material) -> Self {
        Self {
            uuid: material.id.to_string(),
            owner_uuid: material.owner_id.to_string(),
            title: material.title.clone(),
            cover_image_url: material.cover_image_url.clone(),
            description: material.description.clone(),
            content: material.content.clone(),
            read_time_minutes: material.read_time_minutes,
            status: material.status.as_str().to_string(),
            created_at: material.created_at,
            edited_at: material.edited_at,
            published_at: material.published_at,
            archived_at: material.archived_at,
            likes_count: material.likes_count,
        }
    }
}

impl From<Material> for MaterialView {
    fn from(material: Material) -> Self {
        Self::from(&material)
    }
}

impl From<Material> for MaterialResponse {
    fn from(material: Material) -> Self {
        Self {
            material: material.into(),
        }
    }
}

impl From<Vec<Material>> for MaterialListResponse {
    fn from(materials: Vec<Material>) -> Self {
        Self {
            material_list: materials.iter().map(MaterialView::from).collect(),
        }
    }
}

// ============================================================================
// Request Mappers
// ============================================================================

impl From<SaveDraftMaterialRequest> for MaterialFields {
    fn from(req: SaveDraftMaterialRequest) -> Self {
        Self {
            title: req.title,
            cover_image_url: req.cover_image_url,
            description: req.description,
            content: req.content,
            read_time_minutes: req.read_time_minutes,
        }
    }
}

impl From<EditMaterialRequest> for MaterialFields {
    fn from(req: EditMaterialRequest) -> Self {
        Self {
            title: req.title,
            cover_image_url: req.cover_image_url,
            description: req.description,
            content: req.content,
            read_time_minutes: req.read_time_minutes,
        }
    }
}
