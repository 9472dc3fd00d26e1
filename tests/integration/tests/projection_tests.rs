//! User projection end-to-end tests
//!
//! Publish user events to Redis Streams and watch the consumer apply them.
//! Requires DATABASE_URL and REDIS_URL.
//!
//! Run with: cargo test -p integration-tests --test projection_tests

use std::time::Duration;

use integration_tests::{check_test_env, test_config, unique_user};
use materials_cache::{RedisPool, StreamPublisher};
use materials_core::{EventPublisher, UserId, UserProfile, UserRepository};
use materials_db::{create_pool, run_migrations, DatabaseConfig, PgUserRepository};
use serde_json::json;
use tokio::sync::watch;

/// Poll until `check` holds or the deadline passes
async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..50 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    false
}

async fn profile(repo: &PgUserRepository, id: &UserId) -> Option<UserProfile> {
    repo.find_by_id(id).await.unwrap()
}

#[tokio::test]
async fn test_user_events_update_projection() {
    if !check_test_env().await {
        return;
    }

    // Private topics so replays from other runs stay out of the way
    let run = uuid::Uuid::new_v4();
    let created_topic = format!("it.user.created.{run}");
    let nickname_topic = format!("it.user.nickname.{run}");
    let avatar_topic = format!("it.avatar.updated.{run}");
    let config = test_config(&[
        ("USER_CREATED_TOPIC", created_topic.as_str()),
        ("USER_NICKNAME_TOPIC", nickname_topic.as_str()),
        ("AVATAR_SET_TOPIC", avatar_topic.as_str()),
        ("MATERIALS_CONSUMER_NAME", "integration"),
    ])
    .unwrap();

    let pool = create_pool(&DatabaseConfig::from(&config.database))
        .await
        .unwrap();
    run_migrations(&pool, None).await.unwrap();
    let users = PgUserRepository::new(pool);
    let publisher = StreamPublisher::new(RedisPool::from_config(&config.redis).unwrap());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer = tokio::spawn(materials_consumer::run(config, shutdown_rx));

    let user = unique_user("projected");
    let id = UserId::parse(&user).unwrap();

    let created = json!({"userUuid": user, "userNickname": "neo"}).to_string();
    publisher.publish(&created_topic, &user, &created).await.unwrap();
    // Replay must not create a second row or overwrite the first
    let replay = json!({"userUuid": user, "userNickname": "smith"}).to_string();
    publisher.publish(&created_topic, &user, &replay).await.unwrap();

    assert!(
        eventually(|| async { profile(&users, &id).await.is_some() }).await,
        "user row never appeared"
    );

    let nickname = json!({"userUuid": user, "nickname": "trinity"}).to_string();
    publisher.publish(&nickname_topic, &user, &nickname).await.unwrap();
    let avatar = json!({"uuid": user, "link": "https://img.example.com/a.png"}).to_string();
    publisher.publish(&avatar_topic, &user, &avatar).await.unwrap();

    // Malformed entries are dropped without stalling the stream
    publisher
        .publish(&nickname_topic, &user, "{not json")
        .await
        .unwrap();

    assert!(
        eventually(|| async {
            profile(&users, &id).await.is_some_and(|p| {
                p.nickname == "trinity" && p.avatar_link == "https://img.example.com/a.png"
            })
        })
        .await,
        "projection never caught up"
    );

    // Updates for unknown users are skipped
    let stranger = unique_user("stranger");
    let ghost = json!({"userUuid": stranger, "nickname": "ghost"}).to_string();
    publisher.publish(&nickname_topic, &stranger, &ghost).await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(profile(&users, &UserId::parse(&stranger).unwrap())
        .await
        .is_none());

    shutdown_tx.send(true).unwrap();
    consumer.await.unwrap().unwrap();
}
