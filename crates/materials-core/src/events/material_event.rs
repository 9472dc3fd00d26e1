//! Events emitted after a material change commits

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Material;
use crate::value_objects::{MaterialId, UserId};

/// Event kind, used to look up the destination topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialEventKind {
    Created,
    Edited,
    LikeToggled,
    Deleted,
}

impl MaterialEventKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "material_created",
            Self::Edited => "material_edited",
            Self::LikeToggled => "toggle_like",
            Self::Deleted => "material_deleted",
        }
    }
}

/// Material published (announced to followers of the owner)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialCreatedEvent {
    pub material: Material,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialEditedEvent {
    pub uuid: MaterialId,
    pub owner_uuid: UserId,
    pub title: String,
    pub edited_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialLikeToggledEvent {
    pub material_uuid: MaterialId,
    pub user_uuid: UserId,
    pub is_liked: bool,
    pub likes_count: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDeletedEvent {
    pub uuid: MaterialId,
    pub owner_uuid: UserId,
    pub deleted_at: DateTime<Utc>,
}

/// All events this service produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialEvent {
    Created(MaterialCreatedEvent),
    Edited(MaterialEditedEvent),
    LikeToggled(MaterialLikeToggledEvent),
    Deleted(MaterialDeletedEvent),
}

impl MaterialEvent {
    pub fn created(material: Material) -> Self {
        Self::Created(MaterialCreatedEvent { material })
    }

    pub fn edited(material: &Material) -> Self {
        Self::Edited(MaterialEditedEvent {
            uuid: material.id,
            owner_uuid: material.owner_id.clone(),
            title: material.title.clone(),
            edited_at: material.edited_at,
        })
    }

    pub fn like_toggled(
        material_id: MaterialId,
        user_id: UserId,
        is_liked: bool,
        likes_count: i32,
    ) -> Self {
        Self::LikeToggled(MaterialLikeToggledEvent {
            material_uuid: material_id,
            user_uuid: user_id,
            is_liked,
            likes_count,
        })
    }

    pub fn deleted(material_id: MaterialId, owner_id: UserId, deleted_at: DateTime<Utc>) -> Self {
        Self::Deleted(MaterialDeletedEvent {
            uuid: material_id,
            owner_uuid: owner_id,
            deleted_at,
        })
    }

    pub fn kind(&self) -> MaterialEventKind {
        match self {
            Self::Created(_) => MaterialEventKind::Created,
            Self::Edited(_) => MaterialEventKind::Edited,
            Self::LikeToggled(_) => MaterialEventKind::LikeToggled,
            Self::Deleted(_) => MaterialEventKind::Deleted,
        }
    }

    /// Partition key: owner for creation/deletion, material for edits and likes
    pub fn key(&self) -> String {
        match self {
            Self::Created(e) => e.material.owner_id.to_string(),
            Self::Edited(e) => e.uuid.to_string(),
            Self::LikeToggled(e) => e.material_uuid.to_string(),
            Self::Deleted(e) => e.owner_uuid.to_string(),
        }
    }

    /// JSON payload as written to the bus
    pub fn payload(&self) -> serde_json::Result<String> {
        match self {
            Self::Created(e) => serde_json::to_string(e),
            Self::Edited(e) => serde_json::to_string(e),
            Self::LikeToggled(e) => serde_json::to_string(e),
            Self::Deleted(e) => serde_json::to_string(e),
        }
    }
}
