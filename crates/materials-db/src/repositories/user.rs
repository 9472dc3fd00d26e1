//! PostgreSQL implementation of UserRepository (the user projection)

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use materials_core::entities::UserProfile;
use materials_core::traits::{RepoResult, UserRepository};
use materials_core::value_objects::UserId;

use crate::models::UserModel;

use super::error::map_db_error;

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: &UserProfile) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (uuid, nickname, avatar_link, name, surname)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (uuid) DO NOTHING
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.nickname)
        .bind(&user.avatar_link)
        .bind(&user.name)
        .bind(&user.surname)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn update_nickname(&self, id: &UserId, nickname: &str) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET nickname = $2 WHERE uuid = $1
            "#,
        )
        .bind(id.as_str())
        .bind(nickname)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn update_avatar(&self, id: &UserId, avatar_link: &str) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET avatar_link = $2 WHERE uuid = $1
            "#,
        )
        .bind(id.as_str())
        .bind(avatar_link)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &UserId) -> RepoResult<Option<UserProfile>> {
        let result = sqlx::query_as::<_, UserModel>(
            r#"
            SELECT uuid, nickname, avatar_link, name, surname, created_at
            FROM users
            WHERE uuid = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(UserProfile::try_from).transpose()
    }
}
