//! HTTP Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Running Redis instance
//! - Environment variables: DATABASE_URL, REDIS_URL
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_json, assert_status, check_test_env, fixtures::*, test_config, unique_user,
    TestServer,
};
use reqwest::StatusCode;

async fn save_draft(server: &TestServer, owner: &str, draft: &DraftRequest) -> String {
    let response = server
        .post(paths::SAVE_DRAFT, Some(owner), draft)
        .await
        .unwrap();
    let saved: SaveDraftMaterialResponse = assert_json(response, StatusCode::OK).await.unwrap();
    saved.uuid
}

async fn fetch(server: &TestServer, uuid: &str) -> reqwest::Response {
    server
        .post(paths::GET, None, &MaterialRef::new(uuid))
        .await
        .unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_startup_fails_without_redis() {
    if !check_test_env().await {
        return;
    }

    let config = test_config(&[("REDIS_URL", "redis://127.0.0.1:1")]).unwrap();
    assert!(TestServer::start_with_config(config).await.is_err());
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

#[tokio::test]
async fn test_draft_publish_fetch() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let owner = unique_user("owner");
    let draft = DraftRequest::unique();
    let uuid = save_draft(&server, &owner, &draft).await;

    let response = server
        .post(paths::PUBLISH, Some(owner.as_str()), &UuidRequest::new(&uuid))
        .await
        .unwrap();
    let published: MaterialResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(published.material.status, "published");
    assert!(published.material.published_at.is_some());

    let fetched: MaterialResponse = assert_json(fetch(&server, &uuid).await, StatusCode::OK)
        .await
        .unwrap();
    assert_eq!(fetched.material.uuid, uuid);
    assert_eq!(fetched.material.owner_uuid, owner);
    assert_eq!(fetched.material.title, draft.title);
    assert_eq!(fetched.material.status, "published");
    assert_eq!(fetched.material.likes_count, 0);
}

#[tokio::test]
async fn test_non_owner_publish_is_forbidden() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let owner = unique_user("owner");
    let uuid = save_draft(&server, &owner, &DraftRequest::unique()).await;

    let response = server
        .post(paths::PUBLISH, Some(unique_user("intruder").as_str()), &UuidRequest::new(&uuid))
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let fetched: MaterialResponse = assert_json(fetch(&server, &uuid).await, StatusCode::OK)
        .await
        .unwrap();
    assert_eq!(fetched.material.status, "draft");
    assert!(fetched.material.published_at.is_none());
}

#[tokio::test]
async fn test_missing_caller_is_unauthorized() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .post(paths::SAVE_DRAFT, None, &DraftRequest::unique())
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_edit_then_fetch() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let owner = unique_user("editor");
    let draft = DraftRequest::unique();
    let uuid = save_draft(&server, &owner, &draft).await;

    let mut edit = EditRequest::from_draft(&uuid, &draft);
    edit.title = format!("{} (revised)", draft.title);
    edit.read_time_minutes = 12;

    let response = server.post(paths::EDIT, Some(owner.as_str()), &edit).await.unwrap();
    let first: MaterialResponse = assert_json(response, StatusCode::OK).await.unwrap();
    let first_edit = first.material.edited_at.expect("edited_at set");

    let response = server.post(paths::EDIT, Some(owner.as_str()), &edit).await.unwrap();
    let second: MaterialResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(second.material.edited_at.unwrap() > first_edit);

    let fetched: MaterialResponse = assert_json(fetch(&server, &uuid).await, StatusCode::OK)
        .await
        .unwrap();
    assert_eq!(fetched.material.title, edit.title);
    assert_eq!(fetched.material.read_time_minutes, 12);
}

#[tokio::test]
async fn test_concurrent_toggles_stay_consistent() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let owner = unique_user("owner");
    let uuid = save_draft(&server, &owner, &DraftRequest::unique()).await;
    let likers: Vec<String> = (0..10).map(|i| unique_user(&format!("liker{i}"))).collect();

    let toggles = likers.iter().map(|liker| {
        let server = &server;
        let uuid = uuid.clone();
        async move {
            server
                .post(paths::TOGGLE_LIKE, Some(liker.as_str()), &MaterialRef::new(&uuid))
                .await
                .unwrap()
        }
    });
    for response in futures::future::join_all(toggles).await {
        let toggled: ToggleLikeResponse = assert_json(response, StatusCode::OK).await.unwrap();
        assert!(toggled.is_liked);
    }

    let fetched: MaterialResponse = assert_json(fetch(&server, &uuid).await, StatusCode::OK)
        .await
        .unwrap();
    assert_eq!(fetched.material.likes_count, 10);

    // Toggling again undoes a like
    let response = server
        .post(paths::TOGGLE_LIKE, Some(likers[0].as_str()), &MaterialRef::new(&uuid))
        .await
        .unwrap();
    let toggled: ToggleLikeResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!toggled.is_liked);
    assert_eq!(toggled.likes_count, 9);
}

#[tokio::test]
async fn test_delete_then_fetch_is_not_found() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let owner = unique_user("owner");
    let uuid = save_draft(&server, &owner, &DraftRequest::unique()).await;

    let response = server
        .post(paths::DELETE, Some(owner.as_str()), &UuidRequest::new(&uuid))
        .await
        .unwrap();
    let _: EmptyResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_status(fetch(&server, &uuid).await, StatusCode::NOT_FOUND)
        .await
        .unwrap();

    let response = server
        .post(paths::DELETE, Some(owner.as_str()), &UuidRequest::new(&uuid))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("already deleted"));

    let listed: MaterialListResponse = assert_json(
        server.get(&format!("{}?limit=100", paths::LIST)).await.unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert!(listed.material_list.iter().all(|m| m.uuid != uuid));
}

#[tokio::test]
async fn test_archive_twice() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let owner = unique_user("owner");
    let uuid = save_draft(&server, &owner, &DraftRequest::unique()).await;

    let response = server
        .post(paths::ARCHIVE, Some(owner.as_str()), &UuidRequest::new(&uuid))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server
        .post(paths::ARCHIVE, Some(owner.as_str()), &UuidRequest::new(&uuid))
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_pagination_normalisation() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let owner = unique_user("paginator");
    for _ in 0..11 {
        save_draft(&server, &owner, &DraftRequest::unique()).await;
    }

    for query in ["", "?page=0&limit=1000", "?page=abc&limit=-3", "?page=1&limit=10"] {
        let listed: MaterialListResponse = assert_json(
            server.get(&format!("{}{query}", paths::LIST)).await.unwrap(),
            StatusCode::OK,
        )
        .await
        .unwrap();
        assert_eq!(listed.material_list.len(), 10, "query {query:?}");
        assert!(listed
            .material_list
            .windows(2)
            .all(|w| w[0].created_at >= w[1].created_at));
    }

    let listed: MaterialListResponse = assert_json(
        server.get(&format!("{}?page=1&limit=3", paths::LIST)).await.unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_eq!(listed.material_list.len(), 3);
}
