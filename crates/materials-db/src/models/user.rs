//! User projection database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for users table
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub uuid: String,
    pub nickname: String,
    pub avatar_link: String,
    pub name: String,
    pub surname: String,
    pub created_at: DateTime<Utc>,
}
