//! Material entity - a long-form article owned by a single user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{MaterialId, MaterialStatus, UserId};

/// Editable fields of a material, shared by draft creation and edits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialFields {
    pub title: String,
    pub cover_image_url: String,
    pub description: String,
    pub content: Option<String>,
    pub read_time_minutes: i32,
}

impl MaterialFields {
    /// Check field-level rules: non-blank title, non-negative read time
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::TitleRequired);
        }
        if self.read_time_minutes < 0 {
            return Err(DomainError::NegativeReadTime(self.read_time_minutes));
        }
        Ok(())
    }
}

/// Material entity
///
/// Serialized form (cache values, event payloads) uses the platform's
/// camelCase field names with `uuid` / `ownerUuid` identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[serde(rename = "uuid")]
    pub id: MaterialId,
    #[serde(rename = "ownerUuid")]
    pub owner_id: UserId,
    pub title: String,
    pub cover_image_url: String,
    pub description: String,
    pub content: Option<String>,
    pub read_time_minutes: i32,
    pub status: MaterialStatus,
    pub likes_count: i32,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Material {
    /// Create a new draft owned by `owner_id`
    pub fn new_draft(id: MaterialId, owner_id: UserId, fields: MaterialFields) -> Self {
        Self {
            id,
            owner_id,
            title: fields.title,
            cover_image_url: fields.cover_image_url,
            description: fields.description,
            content: fields.content,
            read_time_minutes: fields.read_time_minutes,
            status: MaterialStatus::Draft,
            likes_count: 0,
            created_at: Utc::now(),
            edited_at: None,
            published_at: None,
            archived_at: None,
            deleted_at: None,
        }
    }

    #[inline]
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner_id == user_id
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }

    /// Ensure the lifecycle allows moving to `next`
    pub fn ensure_transition(&self, next: MaterialStatus) -> Result<(), DomainError> {
        if self.is_deleted() || !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        Ok(())
    }

    /// Apply edited fields in memory. Persistence sets the authoritative `edited_at`.
    pub fn apply(&mut self, fields: MaterialFields) {
        self.title = fields.title;
        self.cover_image_url = fields.cover_image_url;
        self.description = fields.description;
        self.content = fields.content;
        self.read_time_minutes = fields.read_time_minutes;
        self.edited_at = Some(Utc::now());
    }
}
