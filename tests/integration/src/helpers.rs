//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers, making HTTP and gRPC
//! calls, and checking the environment.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use materials_api::extractors::USER_HEADER;
use materials_api::grpc::{MaterialsGrpc, Rpc, USER_METADATA_KEY};
use materials_api::server::{create_app, create_app_state, Multiplexer};
use materials_common::AppConfig;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tonic::transport::Channel;

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub config: AppConfig,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config(&[])?).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = create_app_state(&config).await?;
        let http = create_app(state.clone(), config.server.request_timeout());
        let mux = Multiplexer::new(http, MaterialsGrpc::new(state));

        // Any free port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, tower::make::Shared::new(mux))
                .await
                .ok();
        });

        // Wait for server to be ready
        tokio::time::sleep(Duration::from_millis(100)).await;

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            addr,
            client,
            config,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a POST request with JSON body, optionally as a user
    pub async fn post<T: Serialize>(
        &self,
        path: &str,
        user: Option<&str>,
        body: &T,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        let mut request = self.client.post(&url).json(body);
        if let Some(user) = user {
            request = request.header(USER_HEADER, user);
        }
        Ok(request.send().await?)
    }

    /// Open a gRPC client on the same listener
    pub async fn grpc(&self) -> Result<GrpcClient> {
        GrpcClient::connect(self.addr).await
    }
}

/// Minimal unary client for `materials.MaterialsService`
pub struct GrpcClient {
    inner: tonic::client::Grpc<Channel>,
}

impl GrpcClient {
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let channel = Channel::from_shared(format!("http://{addr}"))?
            .connect()
            .await?;
        Ok(Self {
            inner: tonic::client::Grpc::new(channel),
        })
    }

    /// Call one method, optionally carrying a caller id
    pub async fn call<Req, Resp>(
        &mut self,
        rpc: Rpc,
        message: Req,
        user: Option<&str>,
    ) -> Result<Resp, tonic::Status>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        self.inner
            .ready()
            .await
            .map_err(|e| tonic::Status::unknown(format!("Service was not ready: {e}")))?;

        let mut request = tonic::Request::new(message);
        if let Some(user) = user {
            let value = user
                .parse()
                .map_err(|_| tonic::Status::invalid_argument("caller id is not valid metadata"))?;
            request.metadata_mut().insert(USER_METADATA_KEY, value);
        }

        let path = http::uri::PathAndQuery::try_from(rpc.path())
            .map_err(|e| tonic::Status::internal(e.to_string()))?;
        let codec = tonic_prost::ProstCodec::<Req, Resp>::default();
        let response = self.inner.unary(request, path, codec).await?;
        Ok(response.into_inner())
    }
}

/// Create a test configuration from the environment, with overrides
pub fn test_config(overrides: &[(&str, &str)]) -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let overrides: HashMap<String, String> = overrides
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();

    let config = AppConfig::from_lookup(|key| {
        overrides
            .get(key)
            .cloned()
            .or_else(|| std::env::var(key).ok())
            .or_else(|| (key == "MATERIALS_SERVICE_PORT").then(|| "0".to_string()))
    })
    .map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    Ok(config)
}

/// Helper to check if test environment is available
pub async fn check_test_env() -> bool {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }

    if std::env::var("REDIS_URL").is_err() {
        eprintln!("Skipping test: REDIS_URL not set");
        return false;
    }

    true
}

/// A caller id no other test run will reuse
pub fn unique_user(tag: &str) -> String {
    format!("{tag}-{}", uuid::Uuid::new_v4())
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(())
}
