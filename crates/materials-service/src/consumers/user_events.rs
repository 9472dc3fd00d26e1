//! Handlers for user-created, nickname-updated and avatar-updated events

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{error, warn};

use materials_cache::{Delivery, StreamHandler, StreamMessage};
use materials_common::Metrics;
use materials_core::{AvatarUpdatedEvent, NicknameUpdatedEvent, UserCreatedEvent};

use crate::services::{ServiceContext, ServiceResult, UserProjectionService};

/// Which user event a handler consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserEventKind {
    Created,
    NicknameUpdated,
    AvatarUpdated,
}

impl UserEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "user_created",
            Self::NicknameUpdated => "nickname_updated",
            Self::AvatarUpdated => "avatar_updated",
        }
    }
}

/// Stream handler that projects one kind of user event
#[derive(Clone)]
pub struct ProjectionHandler {
    ctx: ServiceContext,
    metrics: Metrics,
    kind: UserEventKind,
}

impl ProjectionHandler {
    pub fn new(ctx: ServiceContext, metrics: Metrics, kind: UserEventKind) -> Self {
        Self { ctx, metrics, kind }
    }

    pub fn user_created(ctx: ServiceContext, metrics: Metrics) -> Self {
        Self::new(ctx, metrics, UserEventKind::Created)
    }

    pub fn nickname_updated(ctx: ServiceContext, metrics: Metrics) -> Self {
        Self::new(ctx, metrics, UserEventKind::NicknameUpdated)
    }

    pub fn avatar_updated(ctx: ServiceContext, metrics: Metrics) -> Self {
        Self::new(ctx, metrics, UserEventKind::AvatarUpdated)
    }

    pub fn kind(&self) -> UserEventKind {
        self.kind
    }

    /// Topic this handler should be attached to
    pub fn topic(&self) -> &str {
        let topics = self.ctx.topics();
        match self.kind {
            UserEventKind::Created => &topics.user_created,
            UserEventKind::NicknameUpdated => &topics.nickname_updated,
            UserEventKind::AvatarUpdated => &topics.avatar_updated,
        }
    }

    async fn apply(&self, payload: &str) -> Result<ServiceResult<bool>, serde_json::Error> {
        let service = UserProjectionService::new(&self.ctx);
        Ok(match self.kind {
            UserEventKind::Created => service.create_user(&decode::<UserCreatedEvent>(payload)?).await,
            UserEventKind::NicknameUpdated => {
                service
                    .update_nickname(&decode::<NicknameUpdatedEvent>(payload)?)
                    .await
            }
            UserEventKind::AvatarUpdated => {
                service
                    .update_avatar(&decode::<AvatarUpdatedEvent>(payload)?)
                    .await
            }
        })
    }

    fn record(&self, message: &StreamMessage, outcome: &str) {
        self.metrics.observe_consumed(&message.topic, outcome);
    }
}

fn decode<T: DeserializeOwned>(payload: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(payload)
}

#[async_trait]
impl StreamHandler for ProjectionHandler {
    async fn handle(&self, message: &StreamMessage) -> Delivery {
        let event = self.kind.as_str();

        let Some(payload) = message.payload.as_deref() else {
            warn!(event, entry_id = %message.id, "Entry without payload, dropping");
            self.record(message, "malformed");
            return Delivery::Ack;
        };

        match self.apply(payload).await {
            Err(e) => {
                warn!(event, entry_id = %message.id, error = %e, "Undecodable event, dropping");
                self.record(message, "malformed");
                Delivery::Ack
            }
            Ok(Ok(true)) => {
                self.record(message, "applied");
                Delivery::Ack
            }
            Ok(Ok(false)) => {
                self.record(message, "skipped");
                Delivery::Ack
            }
            Ok(Err(e)) if e.is_transient() => {
                error!(event, entry_id = %message.id, error = %e, "Failed to apply event, will retry");
                self.record(message, "retry");
                Delivery::Retry
            }
            Ok(Err(e)) => {
                warn!(event, entry_id = %message.id, error = %e, "Invalid event, dropping");
                self.record(message, "invalid");
                Delivery::Ack
            }
        }
    }
}
