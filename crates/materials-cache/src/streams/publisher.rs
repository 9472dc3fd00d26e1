//! Redis Streams publisher.

use async_trait::async_trait;
use redis::streams::StreamMaxlen;
use redis::AsyncCommands;

use materials_core::error::DomainError;
use materials_core::traits::{EventPublisher, RepoResult};

use super::{FIELD_KEY, FIELD_PAYLOAD};
use crate::pool::{RedisPool, RedisPoolError, RedisResult};

/// Appends events to Redis Streams with `XADD`
#[derive(Debug, Clone)]
pub struct StreamPublisher {
    pool: RedisPool,
    max_len: Option<usize>,
}

impl StreamPublisher {
    /// Create a publisher whose streams grow without trimming
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self {
            pool,
            max_len: None,
        }
    }

    /// Trim each stream to roughly `max_len` entries on every append
    #[must_use]
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    /// Append one entry and return the id Redis assigned to it
    pub async fn append(&self, topic: &str, key: &str, payload: &str) -> RedisResult<String> {
        let mut conn = self.pool.get().await?;
        let fields = [(FIELD_KEY, key), (FIELD_PAYLOAD, payload)];

        let id: String = match self.max_len {
            Some(max_len) => {
                conn.xadd_maxlen(topic, StreamMaxlen::Approx(max_len), "*", &fields)
                    .await?
            }
            None => conn.xadd(topic, "*", &fields).await?,
        };

        Ok(id)
    }
}

#[async_trait]
impl EventPublisher for StreamPublisher {
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> RepoResult<()> {
        let id = self
            .append(topic, key, payload)
            .await
            .map_err(|e: RedisPoolError| DomainError::EventBusError(e.to_string()))?;

        tracing::debug!(topic = %topic, key = %key, entry_id = %id, "Published event");
        Ok(())
    }
}
