//! gRPC Integration Tests
//!
//! Exercise `materials.MaterialsService` on the same listener as HTTP.
//! Requires DATABASE_URL and REDIS_URL.
//!
//! Run with: cargo test -p integration-tests --test grpc_tests

use integration_tests::{check_test_env, unique_user, TestServer};
use materials_api::grpc::{proto, Rpc};
use tonic::Code;

fn draft(title: &str) -> proto::SaveDraftMaterialIn {
    proto::SaveDraftMaterialIn {
        title: title.to_string(),
        content: Some("Body".to_string()),
        description: "gRPC material".to_string(),
        cover_image_url: "https://cdn.example.com/grpc.png".to_string(),
        read_time_minutes: 3,
    }
}

#[tokio::test]
async fn test_grpc_lifecycle() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let mut client = server.grpc().await.expect("Failed to connect");
    let owner = unique_user("grpc-owner");

    let saved: proto::SaveDraftMaterialOut = client
        .call(Rpc::SaveDraftMaterial, draft("Over gRPC"), Some(owner.as_str()))
        .await
        .unwrap();

    let published: proto::PublishMaterialOut = client
        .call(
            Rpc::PublishMaterial,
            proto::PublishMaterialIn {
                uuid: saved.uuid.clone(),
            },
            Some(owner.as_str()),
        )
        .await
        .unwrap();
    assert_eq!(published.material.unwrap().status, "published");

    let liked: proto::ToggleLikeOut = client
        .call(
            Rpc::ToggleLike,
            proto::ToggleLikeIn {
                material_uuid: saved.uuid.clone(),
            },
            Some(unique_user("grpc-liker").as_str()),
        )
        .await
        .unwrap();
    assert!(liked.is_liked);
    assert_eq!(liked.likes_count, 1);

    let fetched: proto::GetMaterialOut = client
        .call(
            Rpc::GetMaterial,
            proto::GetMaterialIn {
                material_uuid: saved.uuid.clone(),
            },
            None,
        )
        .await
        .unwrap();
    let material = fetched.material.unwrap();
    assert_eq!(material.title, "Over gRPC");
    assert_eq!(material.owner_uuid, owner);
    assert_eq!(material.likes_count, 1);

    let _: proto::DeleteMaterialOut = client
        .call(
            Rpc::DeleteMaterial,
            proto::DeleteMaterialIn {
                uuid: saved.uuid.clone(),
            },
            Some(owner.as_str()),
        )
        .await
        .unwrap();

    let gone = client
        .call::<_, proto::GetMaterialOut>(
            Rpc::GetMaterial,
            proto::GetMaterialIn {
                material_uuid: saved.uuid,
            },
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(gone.code(), Code::NotFound);
}

#[tokio::test]
async fn test_grpc_requires_caller_metadata() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let mut client = server.grpc().await.expect("Failed to connect");

    let status = client
        .call::<_, proto::SaveDraftMaterialOut>(Rpc::SaveDraftMaterial, draft("Anon"), None)
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);

    // Listing stays public
    let listed: proto::GetAllMaterialsOut = client
        .call(
            Rpc::GetAllMaterials,
            proto::GetAllMaterialsIn { page: 1, limit: 5 },
            None,
        )
        .await
        .unwrap();
    assert!(listed.material_list.len() <= 5);
}

#[tokio::test]
async fn test_grpc_non_owner_is_denied() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let mut client = server.grpc().await.expect("Failed to connect");
    let owner = unique_user("grpc-owner");

    let saved: proto::SaveDraftMaterialOut = client
        .call(Rpc::SaveDraftMaterial, draft("Mine"), Some(owner.as_str()))
        .await
        .unwrap();

    let status = client
        .call::<_, proto::ArchivedMaterialOut>(
            Rpc::ArchivedMaterial,
            proto::ArchivedMaterialIn { uuid: saved.uuid },
            Some(unique_user("grpc-intruder").as_str()),
        )
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::PermissionDenied);
}
