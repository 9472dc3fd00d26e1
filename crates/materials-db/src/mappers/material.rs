//! Material entity <-> model mapper

use materials_core::entities::Material;
use materials_core::error::DomainError;
use materials_core::value_objects::{MaterialId, MaterialStatus, UserId};
use uuid::Uuid;

use crate::models::MaterialModel;

impl TryFrom<MaterialModel> for Material {
    type Error = DomainError;

    fn try_from(model: MaterialModel) -> Result<Self, Self::Error> {
        let status = model
            .status
            .parse::<MaterialStatus>()
            .map_err(DomainError::DatabaseError)?;
        let owner_id = UserId::parse(&model.owner_uuid).map_err(|e| {
            DomainError::DatabaseError(format!("material {} has bad owner: {e}", model.uuid))
        })?;

        Ok(Material {
            id: MaterialId::from_uuid(model.uuid),
            owner_id,
            title: model.title,
            cover_image_url: model.cover_image_url,
            description: model.description,
            content: model.content,
            read_time_minutes: model.read_time_minutes,
            status,
            likes_count: model.likes_count,
            created_at: model.created_at,
            edited_at: model.edited_at,
            published_at: model.published_at,
            archived_at: model.archived_at,
            deleted_at: model.deleted_at,
        })
    }
}

/// Borrowed column values for inserting a material
pub struct MaterialInsert<'a> {
    pub uuid: Uuid,
    pub owner_uuid: &'a str,
    pub title: &'a str,
    pub cover_image_url: &'a str,
    pub description: &'a str,
    pub content: Option<&'a str>,
    pub read_time_minutes: i32,
    pub status: &'static str,
}

impl<'a> MaterialInsert<'a> {
    pub fn new(material: &'a Material) -> Self {
        Self {
            uuid: material.id.into_inner(),
            owner_uuid: material.owner_id.as_str(),
            title: &material.title,
            cover_image_url: &material.cover_image_url,
            description: &material.description,
            content: material.content.as_deref(),
            read_time_minutes: material.read_time_minutes,
            status: material.status.as_str(),
        }
    }
}
