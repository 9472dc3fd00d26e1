//! Like entity - one user's like on one material

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::value_objects::{MaterialId, UserId};

/// Like entity. Unique per (material, user).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Like {
    pub id: Uuid,
    pub material_id: MaterialId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub fn new(material_id: MaterialId, user_id: UserId) -> Self {
        Self {
            id: Uuid::new_v4(),
            material_id,
            user_id,
            created_at: Utc::now(),
        }
    }
}
