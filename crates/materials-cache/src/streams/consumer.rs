//! Consumer-group reader for Redis Streams.
//!
//! A [`StreamConsumer`] owns one dedicated connection and loops over
//! `XREADGROUP`. Entries the handler accepts are acknowledged with `XACK`.
//! Entries it asks to retry stay in the group's pending list and are read
//! again from id `0` before new traffic. The connection is rebuilt after
//! any Redis error until the shutdown signal fires.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::streams::{StreamId, StreamReadOptions, StreamReadReply};
use redis::{AsyncCommands, Client, RedisResult};
use tokio::sync::watch;

use super::{FIELD_KEY, FIELD_PAYLOAD};
use crate::pool::redact_url;

/// One entry read from a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamMessage {
    /// Stream entry id (e.g. `1700000000000-0`)
    pub id: String,
    pub topic: String,
    pub key: Option<String>,
    pub payload: Option<String>,
}

impl StreamMessage {
    fn from_entry(topic: &str, entry: &StreamId) -> Self {
        Self {
            id: entry.id.clone(),
            topic: topic.to_string(),
            key: entry.get(FIELD_KEY),
            payload: entry.get(FIELD_PAYLOAD),
        }
    }
}

/// What to do with an entry after handling it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Acknowledge; the entry will not be seen again
    Ack,
    /// Leave pending for redelivery
    Retry,
}

/// Handles entries for a consumer group
#[async_trait]
pub trait StreamHandler: Send + Sync {
    async fn handle(&self, message: &StreamMessage) -> Delivery;
}

/// Consumer configuration
#[derive(Debug, Clone)]
pub struct StreamConsumerConfig {
    pub redis_url: String,
    pub topic: String,
    pub group: String,
    pub consumer_name: String,
    /// Entries fetched per `XREADGROUP`
    pub batch_size: usize,
    /// How long `XREADGROUP` blocks waiting for new entries
    pub block_ms: usize,
    /// Pause after a Redis error or a retried entry
    pub reconnect_delay_ms: u64,
}

impl StreamConsumerConfig {
    #[must_use]
    pub fn new(
        redis_url: impl Into<String>,
        topic: impl Into<String>,
        group: impl Into<String>,
        consumer_name: impl Into<String>,
    ) -> Self {
        Self {
            redis_url: redis_url.into(),
            topic: topic.into(),
            group: group.into(),
            consumer_name: consumer_name.into(),
            batch_size: 16,
            block_ms: 5_000,
            reconnect_delay_ms: 1_000,
        }
    }

    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[must_use]
    pub fn block_ms(mut self, block_ms: usize) -> Self {
        self.block_ms = block_ms;
        self
    }

    #[must_use]
    pub fn reconnect_delay_ms(mut self, delay: u64) -> Self {
        self.reconnect_delay_ms = delay;
        self
    }

    fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

/// Reads one topic as a member of a consumer group
pub struct StreamConsumer<H> {
    config: StreamConsumerConfig,
    handler: Arc<H>,
}

impl<H: StreamHandler + 'static> StreamConsumer<H> {
    #[must_use]
    pub fn new(config: StreamConsumerConfig, handler: Arc<H>) -> Self {
        Self { config, handler }
    }

    #[must_use]
    pub fn config(&self) -> &StreamConsumerConfig {
        &self.config
    }

    /// Consume until `shutdown` flips to `true` or its sender is dropped
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let topic = self.config.topic.clone();
        let group = self.config.group.clone();

        loop {
            if *shutdown.borrow() {
                break;
            }

            match self.run_session(&mut shutdown).await {
                Ok(()) => break,
                Err(e) => {
                    tracing::error!(
                        topic = %topic,
                        group = %group,
                        error = %e,
                        "Stream consumer error, reconnecting..."
                    );
                    if wait_or_shutdown(self.config.reconnect_delay(), &mut shutdown).await {
                        break;
                    }
                }
            }
        }

        tracing::info!(topic = %topic, group = %group, "Stream consumer stopped");
    }

    /// One connection lifetime. `Ok` means shutdown was requested.
    async fn run_session(&self, shutdown: &mut watch::Receiver<bool>) -> RedisResult<()> {
        let client = Client::open(self.config.redis_url.as_str())?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        self.ensure_group(&mut conn).await?;

        tracing::info!(
            url = %redact_url(&self.config.redis_url),
            topic = %self.config.topic,
            group = %self.config.group,
            consumer = %self.config.consumer_name,
            "Stream consumer connected"
        );

        // Drain this consumer's pending entries before taking new ones
        let mut backlog = true;

        loop {
            let entries = tokio::select! {
                read = self.read_batch(&mut conn, backlog) => read?,
                _ = shutdown.changed() => return Ok(()),
            };

            if entries.is_empty() {
                backlog = false;
                continue;
            }

            let mut retry = false;
            for entry in &entries {
                let message = StreamMessage::from_entry(&self.config.topic, entry);
                match self.handler.handle(&message).await {
                    Delivery::Ack => {
                        let _: i64 = conn
                            .xack(&self.config.topic, &self.config.group, &[&message.id])
                            .await?;
                    }
                    Delivery::Retry => {
                        tracing::warn!(
                            topic = %message.topic,
                            entry_id = %message.id,
                            "Entry left pending for redelivery"
                        );
                        retry = true;
                    }
                }
            }

            if retry {
                backlog = true;
                if wait_or_shutdown(self.config.reconnect_delay(), shutdown).await {
                    return Ok(());
                }
            }
        }
    }

    async fn ensure_group(&self, conn: &mut MultiplexedConnection) -> RedisResult<()> {
        let created: RedisResult<()> = conn
            .xgroup_create_mkstream(&self.config.topic, &self.config.group, "0")
            .await;

        match created {
            Ok(()) => {
                tracing::info!(
                    topic = %self.config.topic,
                    group = %self.config.group,
                    "Consumer group created"
                );
                Ok(())
            }
            Err(e) if e.code() == Some("BUSYGROUP") => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn read_batch(
        &self,
        conn: &mut MultiplexedConnection,
        backlog: bool,
    ) -> RedisResult<Vec<StreamId>> {
        let options = StreamReadOptions::default()
            .group(&self.config.group, &self.config.consumer_name)
            .count(self.config.batch_size);
        let (options, start) = if backlog {
            (options, "0")
        } else {
            (options.block(self.config.block_ms), ">")
        };

        let reply: Option<StreamReadReply> = conn
            .xread_options(&[&self.config.topic], &[start], &options)
            .await?;

        Ok(reply
            .map(|reply| reply.keys.into_iter().flat_map(|key| key.ids).collect())
            .unwrap_or_default())
    }
}

/// Sleep for `delay`; returns `true` if shutdown fired first
async fn wait_or_shutdown(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        () = tokio::time::sleep(delay) => *shutdown.borrow(),
        _ = shutdown.changed() => true,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn entry(fields: &[(&str, &str)]) -> StreamId {
        let map: HashMap<String, redis::Value> = fields
            .iter()
            .map(|(k, v)| ((*k).to_string(), redis::Value::BulkString(v.as_bytes().to_vec())))
            .collect();
        StreamId {
            id: "1700000000000-0".to_string(),
            map,
        }
    }

    #[test]
    fn test_message_from_entry() {
        let message = StreamMessage::from_entry(
            "users.created",
            &entry(&[("key", "u-1"), ("payload", r#"{"userUuid":"u-1"}"#)]),
        );

        assert_eq!(message.id, "1700000000000-0");
        assert_eq!(message.topic, "users.created");
        assert_eq!(message.key.as_deref(), Some("u-1"));
        assert_eq!(message.payload.as_deref(), Some(r#"{"userUuid":"u-1"}"#));
    }

    #[test]
    fn test_message_missing_fields() {
        let message = StreamMessage::from_entry("users.created", &entry(&[]));
        assert!(message.key.is_none());
        assert!(message.payload.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = StreamConsumerConfig::new("redis://cache:6379", "t", "g", "c")
            .batch_size(0)
            .block_ms(250)
            .reconnect_delay_ms(50);

        assert_eq!(config.batch_size, 1);
        assert_eq!(config.block_ms, 250);
        assert_eq!(config.reconnect_delay(), Duration::from_millis(50));
    }

    struct Noop;

    #[async_trait]
    impl StreamHandler for Noop {
        async fn handle(&self, _message: &StreamMessage) -> Delivery {
            Delivery::Ack
        }
    }

    #[tokio::test]
    async fn test_run_returns_when_already_shut_down() {
        let (tx, rx) = watch::channel(true);
        let consumer = StreamConsumer::new(
            StreamConsumerConfig::new("redis://127.0.0.1:1", "t", "g", "c"),
            Arc::new(Noop),
        );
        consumer.run(rx).await;
        drop(tx);
    }

    #[tokio::test]
    async fn test_wait_or_shutdown() {
        let (tx, mut rx) = watch::channel(false);
        assert!(!wait_or_shutdown(Duration::from_millis(1), &mut rx).await);

        tx.send(true).unwrap();
        assert!(wait_or_shutdown(Duration::from_secs(60), &mut rx).await);
    }
}
