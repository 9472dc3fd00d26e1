//! Integration tests for materials-cache
//!
//! These tests require a running Redis server.
//! Set REDIS_URL before running:
//!
//! ```bash
//! export REDIS_URL="redis://127.0.0.1:6379"
//! cargo test -p materials-cache --test redis_tests
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use materials_cache::{
    Delivery, RedisMaterialCache, RedisPool, RedisPoolConfig, StreamConsumer,
    StreamConsumerConfig, StreamHandler, StreamMessage, StreamPublisher,
};
use materials_core::entities::{Material, MaterialFields};
use materials_core::traits::{EventPublisher, MaterialCache};
use materials_core::value_objects::{MaterialId, UserId};

async fn get_test_pool() -> Option<RedisPool> {
    let url = std::env::var("REDIS_URL").ok()?;
    let pool = RedisPool::new(RedisPoolConfig {
        url,
        max_connections: 4,
    })
    .ok()?;
    pool.health_check().await.ok()?;
    Some(pool)
}

macro_rules! pool_or_skip {
    () => {
        match get_test_pool().await {
            Some(pool) => pool,
            None => {
                eprintln!("Skipping test: REDIS_URL not set or Redis unreachable");
                return;
            }
        }
    };
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", MaterialId::new())
}

#[tokio::test]
async fn test_material_cache_put_get_evict() {
    let pool = pool_or_skip!();
    let cache = RedisMaterialCache::new(pool, Duration::from_secs(30));
    let material = Material::new_draft(
        MaterialId::new(),
        UserId::parse("owner-1").unwrap(),
        MaterialFields {
            title: "Cached".to_string(),
            read_time_minutes: 3,
            ..MaterialFields::default()
        },
    );

    assert!(cache.get(material.id).await.unwrap().is_none());

    cache.put(&material).await.unwrap();
    assert_eq!(cache.get(material.id).await.unwrap(), Some(material.clone()));

    cache.evict(material.id).await.unwrap();
    assert!(cache.get(material.id).await.unwrap().is_none());

    // Evicting a missing entry is not an error
    cache.evict(material.id).await.unwrap();
}

struct Recorder {
    tx: mpsc::UnboundedSender<StreamMessage>,
    fail_first: std::sync::atomic::AtomicBool,
}

#[async_trait]
impl StreamHandler for Recorder {
    async fn handle(&self, message: &StreamMessage) -> Delivery {
        if self
            .fail_first
            .swap(false, std::sync::atomic::Ordering::SeqCst)
        {
            return Delivery::Retry;
        }
        let _ = self.tx.send(message.clone());
        Delivery::Ack
    }
}

#[tokio::test]
async fn test_publish_and_consume_with_redelivery() {
    let pool = pool_or_skip!();
    let topic = unique("test.stream");
    let publisher = StreamPublisher::new(pool.clone()).with_max_len(1_000);

    // Published before the group exists; the group starts from the beginning
    publisher
        .publish(&topic, "key-1", r#"{"n":1}"#)
        .await
        .unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handler = Arc::new(Recorder {
        tx,
        fail_first: std::sync::atomic::AtomicBool::new(true),
    });
    let config = StreamConsumerConfig::new(pool.url(), &topic, unique("group"), "consumer-1")
        .block_ms(100)
        .reconnect_delay_ms(50);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(StreamConsumer::new(config, handler).run(shutdown_rx));

    publisher
        .publish(&topic, "key-2", r#"{"n":2}"#)
        .await
        .unwrap();

    let mut seen = Vec::new();
    while seen.len() < 2 {
        let message = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("timed out waiting for stream entries")
            .unwrap();
        seen.push(message.key.unwrap());
    }
    seen.sort();
    assert_eq!(seen, vec!["key-1".to_string(), "key-2".to_string()]);

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(10), task)
        .await
        .expect("consumer did not stop")
        .unwrap();
}
