//! PostgreSQL implementation of MaterialRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use materials_core::context::RequestContext;
use materials_core::entities::{Like, Material, MaterialFields};
use materials_core::traits::{MaterialRepository, RepoResult};
use materials_core::value_objects::{MaterialId, UserId};

use crate::mappers::MaterialInsert;
use crate::models::MaterialModel;
use crate::transaction::acquire;

use super::error::{count_to_i32, map_db_error};

/// PostgreSQL implementation of MaterialRepository
#[derive(Clone)]
pub struct PgMaterialRepository {
    pool: PgPool,
}

impl PgMaterialRepository {
    /// Create a new PgMaterialRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_entity(model: Option<MaterialModel>) -> RepoResult<Option<Material>> {
    model.map(Material::try_from).transpose()
}

#[async_trait]
impl MaterialRepository for PgMaterialRepository {
    #[instrument(skip(self, ctx, material), fields(material_id = %material.id))]
    async fn save_draft(&self, ctx: &RequestContext, material: &Material) -> RepoResult<()> {
        let row = MaterialInsert::new(material);
        let mut conn = acquire(&self.pool, ctx).await?;

        sqlx::query(
            r#"
            INSERT INTO materials (
                uuid, owner_uuid, title, cover_image_url, description, content,
                read_time_minutes, status, likes_count, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, $9)
            "#,
        )
        .bind(row.uuid)
        .bind(row.owner_uuid)
        .bind(row.title)
        .bind(row.cover_image_url)
        .bind(row.description)
        .bind(row.content)
        .bind(row.read_time_minutes)
        .bind(row.status)
        .bind(material.created_at)
        .execute(conn.executor()?)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, ctx))]
    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: MaterialId,
    ) -> RepoResult<Option<Material>> {
        let mut conn = acquire(&self.pool, ctx).await?;

        let result = sqlx::query_as::<_, MaterialModel>(
            r#"
            SELECT uuid, owner_uuid, title, cover_image_url, description, content,
                   read_time_minutes, status, likes_count, created_at, edited_at,
                   published_at, archived_at, deleted_at
            FROM materials
            WHERE uuid = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(conn.executor()?)
        .await
        .map_err(map_db_error)?;

        into_entity(result)
    }

    #[instrument(skip(self, ctx))]
    async fn list(
        &self,
        ctx: &RequestContext,
        offset: i64,
        limit: i64,
    ) -> RepoResult<Vec<Material>> {
        let limit = limit.clamp(1, 100);
        let offset = offset.max(0);
        let mut conn = acquire(&self.pool, ctx).await?;

        let results = sqlx::query_as::<_, MaterialModel>(
            r#"
            SELECT uuid, owner_uuid, title, cover_image_url, description, content,
                   read_time_minutes, status, likes_count, created_at, edited_at,
                   published_at, archived_at, deleted_at
            FROM materials
            WHERE deleted_at IS NULL
            ORDER BY created_at DESC, uuid
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(conn.executor()?)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(Material::try_from).collect()
    }

    #[instrument(skip(self, ctx))]
    async fn get_owner(&self, ctx: &RequestContext, id: MaterialId) -> RepoResult<Option<UserId>> {
        let mut conn = acquire(&self.pool, ctx).await?;

        let owner = sqlx::query_scalar::<_, String>(
            r#"
            SELECT owner_uuid FROM materials WHERE uuid = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(conn.executor()?)
        .await
        .map_err(map_db_error)?;

        // A blank owner cannot match any caller, so treat it like a missing row
        Ok(owner.and_then(|o| UserId::parse(o).ok()))
    }

    #[instrument(skip(self, ctx))]
    async fn exists(&self, ctx: &RequestContext, id: MaterialId) -> RepoResult<bool> {
        let mut conn = acquire(&self.pool, ctx).await?;

        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM materials WHERE uuid = $1 AND deleted_at IS NULL)
            "#,
        )
        .bind(id.into_inner())
        .fetch_one(conn.executor()?)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, ctx))]
    async fn lock(&self, ctx: &RequestContext, id: MaterialId) -> RepoResult<Option<Material>> {
        let mut conn = acquire(&self.pool, ctx).await?;

        let result = sqlx::query_as::<_, MaterialModel>(
            r#"
            SELECT uuid, owner_uuid, title, cover_image_url, description, content,
                   read_time_minutes, status, likes_count, created_at, edited_at,
                   published_at, archived_at, deleted_at
            FROM materials
            WHERE uuid = $1 AND deleted_at IS NULL
            FOR UPDATE
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(conn.executor()?)
        .await
        .map_err(map_db_error)?;

        into_entity(result)
    }

    #[instrument(skip(self, ctx, fields))]
    async fn edit(
        &self,
        ctx: &RequestContext,
        id: MaterialId,
        fields: &MaterialFields,
    ) -> RepoResult<Option<Material>> {
        let mut conn = acquire(&self.pool, ctx).await?;

        let result = sqlx::query_as::<_, MaterialModel>(
            r#"
            UPDATE materials
            SET title = $2,
                cover_image_url = $3,
                description = $4,
                content = $5,
                read_time_minutes = $6,
                edited_at = $7
            WHERE uuid = $1 AND deleted_at IS NULL
            RETURNING uuid, owner_uuid, title, cover_image_url, description, content,
                      read_time_minutes, status, likes_count, created_at, edited_at,
                      published_at, archived_at, deleted_at
            "#,
        )
        .bind(id.into_inner())
        .bind(&fields.title)
        .bind(&fields.cover_image_url)
        .bind(&fields.description)
        .bind(fields.content.as_deref())
        .bind(fields.read_time_minutes)
        .bind(Utc::now())
        .fetch_optional(conn.executor()?)
        .await
        .map_err(map_db_error)?;

        into_entity(result)
    }

    #[instrument(skip(self, ctx))]
    async fn publish(&self, ctx: &RequestContext, id: MaterialId) -> RepoResult<Option<Material>> {
        let mut conn = acquire(&self.pool, ctx).await?;

        let result = sqlx::query_as::<_, MaterialModel>(
            r#"
            UPDATE materials
            SET status = 'published', published_at = $2
            WHERE uuid = $1 AND deleted_at IS NULL AND status = 'draft'
            RETURNING uuid, owner_uuid, title, cover_image_url, description, content,
                      read_time_minutes, status, likes_count, created_at, edited_at,
                      published_at, archived_at, deleted_at
            "#,
        )
        .bind(id.into_inner())
        .bind(Utc::now())
        .fetch_optional(conn.executor()?)
        .await
        .map_err(map_db_error)?;

        into_entity(result)
    }

    #[instrument(skip(self, ctx))]
    async fn archive(&self, ctx: &RequestContext, id: MaterialId) -> RepoResult<bool> {
        let mut conn = acquire(&self.pool, ctx).await?;

        let result = sqlx::query(
            r#"
            UPDATE materials
            SET archived_at = $2, status = 'archived'
            WHERE uuid = $1 AND archived_at IS NULL AND deleted_at IS NULL
            "#,
        )
        .bind(id.into_inner())
        .bind(Utc::now())
        .execute(conn.executor()?)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, ctx))]
    async fn soft_delete(
        &self,
        ctx: &RequestContext,
        id: MaterialId,
    ) -> RepoResult<Option<DateTime<Utc>>> {
        let mut conn = acquire(&self.pool, ctx).await?;

        sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"
            UPDATE materials
            SET deleted_at = $2
            WHERE uuid = $1 AND deleted_at IS NULL
            RETURNING deleted_at
            "#,
        )
        .bind(id.into_inner())
        .bind(Utc::now())
        .fetch_optional(conn.executor()?)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, ctx))]
    async fn check_like(
        &self,
        ctx: &RequestContext,
        material_id: MaterialId,
        user_id: &UserId,
    ) -> RepoResult<bool> {
        let mut conn = acquire(&self.pool, ctx).await?;

        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM material_likes WHERE material_uuid = $1 AND user_uuid = $2
            )
            "#,
        )
        .bind(material_id.into_inner())
        .bind(user_id.as_str())
        .fetch_one(conn.executor()?)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, ctx, like), fields(material_id = %like.material_id))]
    async fn add_like(&self, ctx: &RequestContext, like: &Like) -> RepoResult<()> {
        let mut conn = acquire(&self.pool, ctx).await?;

        sqlx::query(
            r#"
            INSERT INTO material_likes (uuid, material_uuid, user_uuid, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (material_uuid, user_uuid) DO NOTHING
            "#,
        )
        .bind(like.id)
        .bind(like.material_id.into_inner())
        .bind(like.user_id.as_str())
        .bind(like.created_at)
        .execute(conn.executor()?)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, ctx))]
    async fn remove_like(
        &self,
        ctx: &RequestContext,
        material_id: MaterialId,
        user_id: &UserId,
    ) -> RepoResult<()> {
        let mut conn = acquire(&self.pool, ctx).await?;

        sqlx::query(
            r#"
            DELETE FROM material_likes WHERE material_uuid = $1 AND user_uuid = $2
            "#,
        )
        .bind(material_id.into_inner())
        .bind(user_id.as_str())
        .execute(conn.executor()?)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, ctx))]
    async fn get_likes_count(
        &self,
        ctx: &RequestContext,
        material_id: MaterialId,
    ) -> RepoResult<i32> {
        let mut conn = acquire(&self.pool, ctx).await?;

        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM material_likes WHERE material_uuid = $1
            "#,
        )
        .bind(material_id.into_inner())
        .fetch_one(conn.executor()?)
        .await
        .map_err(map_db_error)?;

        count_to_i32(count)
    }

    #[instrument(skip(self, ctx))]
    async fn update_likes_count(
        &self,
        ctx: &RequestContext,
        material_id: MaterialId,
        count: i32,
    ) -> RepoResult<()> {
        let mut conn = acquire(&self.pool, ctx).await?;

        sqlx::query(
            r#"
            UPDATE materials SET likes_count = $2 WHERE uuid = $1
            "#,
        )
        .bind(material_id.into_inner())
        .bind(count)
        .execute(conn.executor()?)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}
