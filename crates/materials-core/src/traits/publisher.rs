//! Event bus publishing port

use async_trait::async_trait;

use super::RepoResult;

/// Publishes keyed JSON payloads to a topic on the event bus
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> RepoResult<()>;
}
