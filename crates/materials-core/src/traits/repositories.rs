//! Repository traits (ports) - define the interface for data access
//!
//! These traits follow the Repository pattern from Domain-Driven Design.
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.
//!
//! Material operations take the [`RequestContext`] so they run on whatever
//! executor it carries; the like sub-steps are only meaningful inside a
//! transaction opened with [`crate::context::tx_execute`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::context::RequestContext;
use crate::entities::{Like, Material, MaterialFields, UserProfile};
use crate::error::DomainError;
use crate::value_objects::{MaterialId, UserId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Material Repository
// ============================================================================

#[async_trait]
pub trait MaterialRepository: Send + Sync {
    /// Insert a new draft
    async fn save_draft(&self, ctx: &RequestContext, material: &Material) -> RepoResult<()>;

    /// Find a live (not soft-deleted) material
    async fn find_by_id(&self, ctx: &RequestContext, id: MaterialId)
        -> RepoResult<Option<Material>>;

    /// Page of live materials, newest first
    async fn list(&self, ctx: &RequestContext, offset: i64, limit: i64)
        -> RepoResult<Vec<Material>>;

    /// Owner of a live material
    async fn get_owner(&self, ctx: &RequestContext, id: MaterialId) -> RepoResult<Option<UserId>>;

    /// Whether a live material exists
    async fn exists(&self, ctx: &RequestContext, id: MaterialId) -> RepoResult<bool>;

    /// Load a live material and lock its row until the transaction ends
    async fn lock(&self, ctx: &RequestContext, id: MaterialId) -> RepoResult<Option<Material>>;

    /// Overwrite editable fields and stamp `edited_at`; `None` if the row is gone
    async fn edit(
        &self,
        ctx: &RequestContext,
        id: MaterialId,
        fields: &MaterialFields,
    ) -> RepoResult<Option<Material>>;

    /// Move a draft to published; `None` if no live draft matched
    async fn publish(&self, ctx: &RequestContext, id: MaterialId) -> RepoResult<Option<Material>>;

    /// Archive unless already archived or deleted; returns whether a row changed
    async fn archive(&self, ctx: &RequestContext, id: MaterialId) -> RepoResult<bool>;

    /// Soft delete unless already deleted; returns the deletion time when a row changed
    async fn soft_delete(
        &self,
        ctx: &RequestContext,
        id: MaterialId,
    ) -> RepoResult<Option<DateTime<Utc>>>;

    // ------------------------------------------------------------------------
    // Like sub-steps
    // ------------------------------------------------------------------------

    async fn check_like(
        &self,
        ctx: &RequestContext,
        material_id: MaterialId,
        user_id: &UserId,
    ) -> RepoResult<bool>;

    async fn add_like(&self, ctx: &RequestContext, like: &Like) -> RepoResult<()>;

    async fn remove_like(
        &self,
        ctx: &RequestContext,
        material_id: MaterialId,
        user_id: &UserId,
    ) -> RepoResult<()>;

    /// Count like rows for a material
    async fn get_likes_count(&self, ctx: &RequestContext, material_id: MaterialId)
        -> RepoResult<i32>;

    /// Store the denormalised like counter
    async fn update_likes_count(
        &self,
        ctx: &RequestContext,
        material_id: MaterialId,
        count: i32,
    ) -> RepoResult<()>;
}

// ============================================================================
// User Projection Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert unless a row with the same id exists; returns whether a row was inserted
    async fn create(&self, user: &UserProfile) -> RepoResult<bool>;

    /// Returns whether a row changed
    async fn update_nickname(&self, id: &UserId, nickname: &str) -> RepoResult<bool>;

    /// Returns whether a row changed
    async fn update_avatar(&self, id: &UserId, avatar_link: &str) -> RepoResult<bool>;

    async fn find_by_id(&self, id: &UserId) -> RepoResult<Option<UserProfile>>;
}
