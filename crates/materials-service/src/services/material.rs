//! Material service
//!
//! The material lifecycle engine: drafts, edits, publication, archival,
//! soft deletion and likes.

use std::future::Future;

use tracing::{info, instrument, warn};
use validator::Validate;

use materials_core::entities::{Like, Material, MaterialFields};
use materials_core::{
    tx_execute, DomainError, IdParseError, MaterialEvent, MaterialId, MaterialStatus,
    RequestContext, UserId,
};

use crate::dto::{
    EditMaterialRequest, EmptyResponse, MaterialListResponse, MaterialRefRequest,
    MaterialResponse, MaterialUuidRequest, Pagination, SaveDraftMaterialRequest,
    SaveDraftMaterialResponse, ToggleLikeResponse,
};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::events::EventProducer;

/// Parse a client-supplied material id
pub fn parse_material_id(raw: &str) -> Result<MaterialId, DomainError> {
    MaterialId::parse(raw).map_err(|e| match e {
        IdParseError::Empty => DomainError::MaterialIdRequired,
        IdParseError::InvalidFormat(_) => DomainError::InvalidMaterialId(raw.trim().to_string()),
    })
}

/// Material service
pub struct MaterialService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MaterialService<'a> {
    /// Create a new MaterialService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Save a new draft owned by the caller
    #[instrument(skip(self, rctx, request))]
    pub async fn save_draft(
        &self,
        rctx: &RequestContext,
        request: SaveDraftMaterialRequest,
    ) -> ServiceResult<SaveDraftMaterialResponse> {
        let owner = rctx.require_caller()?.clone();
        request.validate()?;
        let fields = MaterialFields::from(request);
        fields.validate()?;

        let material = Material::new_draft(MaterialId::new(), owner, fields);
        bounded(rctx, self.ctx.material_repo().save_draft(rctx, &material)).await?;

        info!(
            material_id = %material.id,
            owner_id = %material.owner_id,
            "Draft material saved"
        );

        Ok(SaveDraftMaterialResponse {
            uuid: material.id.to_string(),
        })
    }

    /// Fetch one live material, through the cache when one is configured
    #[instrument(skip(self, rctx, request))]
    pub async fn get_material(
        &self,
        rctx: &RequestContext,
        request: MaterialRefRequest,
    ) -> ServiceResult<MaterialResponse> {
        let id = parse_material_id(&request.material_uuid)?;

        if let Some(material) = self.cached(id).await {
            return Ok(material.into());
        }

        let material = bounded(rctx, self.ctx.material_repo().find_by_id(rctx, id))
            .await?
            .ok_or(DomainError::MaterialNotFound(id))?;

        if let Some(cache) = self.ctx.cache() {
            if let Err(e) = cache.put(&material).await {
                warn!(material_id = %id, error = %e, "Failed to cache material");
            }
        }

        Ok(material.into())
    }

    /// Page through live materials, newest first
    #[instrument(skip(self, rctx))]
    pub async fn get_all_materials(
        &self,
        rctx: &RequestContext,
        pagination: Pagination,
    ) -> ServiceResult<MaterialListResponse> {
        let materials = bounded(
            rctx,
            self.ctx
                .material_repo()
                .list(rctx, pagination.offset(), pagination.limit()),
        )
        .await?;

        Ok(materials.into())
    }

    /// Replace the editable fields of a material the caller owns
    #[instrument(skip(self, rctx, request))]
    pub async fn edit_material(
        &self,
        rctx: &RequestContext,
        request: EditMaterialRequest,
    ) -> ServiceResult<MaterialResponse> {
        let caller = rctx.require_caller()?.clone();
        request.validate()?;
        let id = parse_material_id(&request.uuid)?;
        let fields = MaterialFields::from(request);
        fields.validate()?;

        let repo = self.ctx.material_repo();
        let material = bounded(rctx, async {
            self.require_owner(rctx, id, &caller, "edit", DomainError::MaterialNotFound)
                .await?;
            repo.edit(rctx, id, &fields)
                .await?
                .ok_or(DomainError::MaterialNotFound(id))
        })
        .await?;

        info!(material_id = %id, "Material edited");

        self.after_commit(rctx, id, Some(MaterialEvent::edited(&material)))
            .await;
        Ok(material.into())
    }

    /// Move a draft the caller owns to published
    #[instrument(skip(self, rctx, request))]
    pub async fn publish_material(
        &self,
        rctx: &RequestContext,
        request: MaterialUuidRequest,
    ) -> ServiceResult<MaterialResponse> {
        let id = parse_material_id(&request.uuid)?;
        let caller = rctx.require_caller()?.clone();

        let repo = self.ctx.material_repo();
        let material = bounded(rctx, async {
            match repo.get_owner(rctx, id).await? {
                None => return Err(DomainError::MaterialMissing(id)),
                Some(owner) if owner != caller => {
                    return Err(DomainError::NotMaterialOwner { action: "publish" })
                }
                Some(_) => {}
            }

            if !repo.exists(rctx, id).await? {
                return Err(DomainError::MaterialMissing(id));
            }

            match repo.publish(rctx, id).await? {
                Some(material) => Ok(material),
                None => {
                    let current = repo
                        .find_by_id(rctx, id)
                        .await?
                        .ok_or(DomainError::MaterialMissing(id))?;
                    Err(DomainError::InvalidTransition {
                        from: current.status,
                        to: MaterialStatus::Published,
                    })
                }
            }
        })
        .await?;

        info!(material_id = %id, owner_id = %caller, "Material published");

        self.after_commit(rctx, id, Some(MaterialEvent::created(material.clone())))
            .await;
        Ok(material.into())
    }

    /// Archive a material the caller owns
    #[instrument(skip(self, rctx, request))]
    pub async fn archive_material(
        &self,
        rctx: &RequestContext,
        request: MaterialUuidRequest,
    ) -> ServiceResult<EmptyResponse> {
        let caller = rctx.require_caller()?.clone();
        let id = parse_material_id(&request.uuid)?;

        let repo = self.ctx.material_repo();
        bounded(rctx, async {
            self.require_owner(rctx, id, &caller, "archive", DomainError::NothingToArchive)
                .await?;
            if repo.archive(rctx, id).await? {
                Ok(())
            } else {
                Err(DomainError::NothingToArchive(id))
            }
        })
        .await?;

        info!(material_id = %id, "Material archived");

        self.after_commit(rctx, id, None).await;
        Ok(EmptyResponse {})
    }

    /// Soft-delete a material the caller owns
    #[instrument(skip(self, rctx, request))]
    pub async fn delete_material(
        &self,
        rctx: &RequestContext,
        request: MaterialUuidRequest,
    ) -> ServiceResult<EmptyResponse> {
        let caller = rctx.require_caller()?.clone();
        let id = parse_material_id(&request.uuid)?;

        let repo = self.ctx.material_repo();
        let deleted_at = bounded(rctx, async {
            self.require_owner(rctx, id, &caller, "delete", DomainError::NothingToDelete)
                .await?;
            repo.soft_delete(rctx, id)
                .await?
                .ok_or(DomainError::NothingToDelete(id))
        })
        .await?;

        info!(material_id = %id, "Material deleted");

        self.after_commit(rctx, id, Some(MaterialEvent::deleted(id, caller, deleted_at)))
            .await;
        Ok(EmptyResponse {})
    }

    /// Like or unlike a material for the caller.
    ///
    /// Runs as one transaction with the material row locked first, so
    /// concurrent toggles on the same material serialise and the stored
    /// counter always equals the number of like rows.
    #[instrument(skip(self, rctx, request))]
    pub async fn toggle_like(
        &self,
        rctx: &RequestContext,
        request: MaterialRefRequest,
    ) -> ServiceResult<ToggleLikeResponse> {
        let caller = rctx.require_caller()?.clone();
        let id = parse_material_id(&request.material_uuid)?;

        let repo = self.ctx.material_repo();
        let liker = caller.clone();
        let (was_liked, likes_count) = bounded(
            rctx,
            tx_execute(rctx, |tx| async move {
                repo.lock(&tx, id)
                    .await?
                    .ok_or(DomainError::MaterialNotFound(id))?;

                let was_liked = repo.check_like(&tx, id, &liker).await?;
                if was_liked {
                    repo.remove_like(&tx, id, &liker).await?;
                } else {
                    repo.add_like(&tx, &Like::new(id, liker.clone())).await?;
                }

                let count = repo.get_likes_count(&tx, id).await?;
                repo.update_likes_count(&tx, id, count).await?;
                Ok::<_, DomainError>((was_liked, count))
            }),
        )
        .await?;

        let is_liked = !was_liked;
        info!(
            material_id = %id,
            user_id = %caller,
            is_liked,
            likes_count,
            "Like toggled"
        );

        self.after_commit(
            rctx,
            id,
            Some(MaterialEvent::like_toggled(id, caller, is_liked, likes_count)),
        )
        .await;

        Ok(ToggleLikeResponse {
            is_liked,
            likes_count,
        })
    }

    /// Owner check shared by edit, archive and delete. `missing` builds the
    /// error for a material that is absent or already soft-deleted.
    async fn require_owner(
        &self,
        rctx: &RequestContext,
        id: MaterialId,
        caller: &UserId,
        action: &'static str,
        missing: fn(MaterialId) -> DomainError,
    ) -> Result<(), DomainError> {
        match self.ctx.material_repo().get_owner(rctx, id).await? {
            None => Err(missing(id)),
            Some(owner) if owner != *caller => Err(DomainError::NotMaterialOwner { action }),
            Some(_) => Ok(()),
        }
    }

    async fn cached(&self, id: MaterialId) -> Option<Material> {
        let cache = self.ctx.cache()?;
        match cache.get(id).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(material_id = %id, error = %e, "Material cache read failed");
                None
            }
        }
    }

    /// Evict the cached copy and publish the event, if any
    async fn after_commit(&self, rctx: &RequestContext, id: MaterialId, event: Option<MaterialEvent>) {
        if let Some(cache) = self.ctx.cache() {
            if let Err(e) = cache.evict(id).await {
                warn!(material_id = %id, error = %e, "Material cache eviction failed");
            }
        }

        if let Some(event) = event {
            EventProducer::new(self.ctx).publish(rctx, event).await;
        }
    }
}

/// Run `work` under the request deadline. An expired deadline drops the
/// future, which rolls back any transaction it opened.
async fn bounded<T, F>(rctx: &RequestContext, work: F) -> ServiceResult<T>
where
    F: Future<Output = Result<T, DomainError>>,
{
    let result = match rctx.deadline() {
        Some(deadline) => tokio::time::timeout_at(deadline.into(), work)
            .await
            .map_err(|_| DomainError::Cancelled)?,
        None => work.await,
    };
    Ok(result?)
}
