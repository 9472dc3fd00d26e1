//! Post-commit event production
//!
//! Events go out only after the database work has committed. A failed or
//! timed-out publish is logged and swallowed: the write already succeeded and
//! the caller gets its result either way.

use materials_core::{MaterialEvent, MaterialEventKind, RequestContext};
use tracing::{debug, error, warn};

use super::context::ServiceContext;

/// Publishes material events to their configured topics
pub struct EventProducer<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> EventProducer<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Topic an event kind is written to
    pub fn topic(&self, kind: MaterialEventKind) -> &'a str {
        let topics = self.ctx.topics();
        match kind {
            MaterialEventKind::Created => &topics.material_created,
            MaterialEventKind::Edited => &topics.material_edited,
            MaterialEventKind::LikeToggled => &topics.like_toggled,
            MaterialEventKind::Deleted => &topics.material_deleted,
        }
    }

    /// Publish within what is left of the request deadline
    pub async fn publish(&self, rctx: &RequestContext, event: MaterialEvent) {
        let topic = self.topic(event.kind());
        let key = event.key();

        let payload = match event.payload() {
            Ok(payload) => payload,
            Err(e) => {
                error!(topic = %topic, key = %key, error = %e, "Failed to encode event");
                return;
            }
        };

        let send = self.ctx.publisher().publish(topic, &key, &payload);
        let result = match rctx.deadline() {
            Some(deadline) => {
                match tokio::time::timeout_at(deadline.into(), send).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(topic = %topic, key = %key, "Event publish hit the request deadline");
                        return;
                    }
                }
            }
            None => send.await,
        };

        match result {
            Ok(()) => debug!(topic = %topic, key = %key, "Event published"),
            Err(e) => error!(topic = %topic, key = %key, error = %e, "Failed to publish event"),
        }
    }
}
