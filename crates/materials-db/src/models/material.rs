//! Material database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for materials table
#[derive(Debug, Clone, FromRow)]
pub struct MaterialModel {
    pub uuid: Uuid,
    pub owner_uuid: String,
    pub title: String,
    pub cover_image_url: String,
    pub description: String,
    pub content: Option<String>,
    pub read_time_minutes: i32,
    pub status: String,
    pub likes_count: i32,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}
