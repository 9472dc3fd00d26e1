//! User projection service
//!
//! Keeps the local copy of user profiles in step with identity events.
//! Every operation is idempotent so redelivered events are harmless.

use tracing::{info, instrument, warn};

use materials_core::entities::UserProfile;
use materials_core::{
    AvatarUpdatedEvent, DomainError, NicknameUpdatedEvent, UserCreatedEvent, UserId,
};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// User projection service
pub struct UserProjectionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserProjectionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Insert a newly registered user; `false` when the user already exists
    #[instrument(skip(self, event), fields(user_id = %event.user_uuid))]
    pub async fn create_user(&self, event: &UserCreatedEvent) -> ServiceResult<bool> {
        let id = parse_user_id(&event.user_uuid)?;
        let profile = UserProfile::new(id, event.user_nickname.clone());

        let created = self.ctx.user_repo().create(&profile).await?;
        if created {
            info!(nickname = %profile.nickname, "User projected");
        } else {
            info!("User already projected, skipping");
        }
        Ok(created)
    }

    /// `false` when the user is unknown
    #[instrument(skip(self, event), fields(user_id = %event.user_uuid))]
    pub async fn update_nickname(&self, event: &NicknameUpdatedEvent) -> ServiceResult<bool> {
        let id = parse_user_id(&event.user_uuid)?;

        let updated = self
            .ctx
            .user_repo()
            .update_nickname(&id, &event.nickname)
            .await?;
        if updated {
            info!(nickname = %event.nickname, "Nickname updated");
        } else {
            warn!("Nickname update for unknown user, skipping");
        }
        Ok(updated)
    }

    /// `false` when the user is unknown
    #[instrument(skip(self, event), fields(user_id = %event.uuid))]
    pub async fn update_avatar(&self, event: &AvatarUpdatedEvent) -> ServiceResult<bool> {
        let id = parse_user_id(&event.uuid)?;

        let updated = self.ctx.user_repo().update_avatar(&id, &event.link).await?;
        if updated {
            info!(link = %event.link, "Avatar updated");
        } else {
            warn!("Avatar update for unknown user, skipping");
        }
        Ok(updated)
    }
}

fn parse_user_id(raw: &str) -> Result<UserId, DomainError> {
    UserId::parse(raw).map_err(|_| DomainError::ValidationError("user uuid is required".to_string()))
}
