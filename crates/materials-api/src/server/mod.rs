//! Server setup and initialization
//!
//! Wires the PostgreSQL, Redis and bus adapters into the shared state and
//! serves HTTP and gRPC from one listener.

use std::convert::Infallible;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use axum::{body::Body, extract::Request, response::Response, routing::get, Router};
use materials_cache::{RedisMaterialCache, RedisPool, StreamPublisher};
use materials_common::{AppConfig, AppError, Metrics};
use materials_core::MaterialCache;
use materials_db::{
    create_pool, run_migrations, DatabaseConfig, PgMaterialRepository, PgPool,
    PgTransactionManager, PgUserRepository,
};
use materials_service::ServiceContextBuilder;
use tokio::net::TcpListener;
use tower::ServiceExt;
use tracing::{info, warn};

use crate::grpc::MaterialsGrpc;
use crate::handlers::metrics::render_metrics;
use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::{AppState, ReadinessProbe};

/// Readiness backed by the live pools
pub struct DependencyProbe {
    pool: PgPool,
    redis: RedisPool,
}

impl DependencyProbe {
    pub fn new(pool: PgPool, redis: RedisPool) -> Self {
        Self { pool, redis }
    }
}

#[async_trait]
impl ReadinessProbe for DependencyProbe {
    async fn database(&self) -> bool {
        self.pool.acquire().await.is_ok()
    }

    async fn redis(&self) -> bool {
        self.redis.health_check().await.is_ok()
    }
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: &AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&DatabaseConfig::from(&config.database))
        .await
        .map_err(AppError::database)?;
    info!("PostgreSQL connection established");

    run_migrations(&pool, config.database.migrations_dir.as_deref().map(Path::new))
        .await
        .map_err(AppError::database)?;
    info!("Migrations applied");

    info!("Connecting to Redis...");
    let redis = RedisPool::connect(&config.redis)
        .await
        .map_err(AppError::cache)?;
    info!("Redis connection established");

    let cache: Option<Arc<dyn MaterialCache>> = if config.cache.enabled() {
        Some(Arc::new(RedisMaterialCache::new(
            redis.clone(),
            Duration::from_secs(config.cache.ttl_secs),
        )))
    } else {
        info!("Material cache disabled");
        None
    };

    let service_context = ServiceContextBuilder::new()
        .tx_manager(Arc::new(PgTransactionManager::new(pool.clone())))
        .material_repo(Arc::new(PgMaterialRepository::new(pool.clone())))
        .user_repo(Arc::new(PgUserRepository::new(pool.clone())))
        .publisher(Arc::new(StreamPublisher::new(redis.clone())))
        .cache(cache)
        .topics(config.topics.clone())
        .request_timeout(config.server.request_timeout())
        .build()
        .map_err(|e| AppError::Server(e.to_string()))?;

    let metrics = Metrics::new().map_err(|e| AppError::Server(e.to_string()))?;
    let readiness = Arc::new(DependencyProbe::new(pool, redis));

    Ok(AppState::new(service_context, metrics, readiness))
}

/// Build the HTTP application with all routes and middleware
pub fn create_app(state: AppState, request_timeout: Duration) -> Router {
    apply_middleware(create_router(state), request_timeout)
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, Infallible>> + Send + 'static>>;

/// Routes gRPC calls to the tonic service and everything else to axum
#[derive(Clone)]
pub struct Multiplexer {
    http: Router,
    grpc: MaterialsGrpc,
}

impl Multiplexer {
    pub fn new(http: Router, grpc: MaterialsGrpc) -> Self {
        Self { http, grpc }
    }
}

fn is_grpc(req: &Request) -> bool {
    req.version() == http::Version::HTTP_2
        && req
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/grpc"))
}

impl tower::Service<Request> for Multiplexer {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<Response>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        if is_grpc(&req) {
            let grpc = self.grpc.clone();
            Box::pin(async move {
                let response = grpc.oneshot(req).await?;
                Ok(response.map(Body::new))
            })
        } else {
            let http = self.http.clone();
            Box::pin(async move { http.oneshot(req).await })
        }
    }
}

/// Resolves on ctrl-c or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}

async fn bind(addr: &str) -> Result<TcpListener, AppError> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Server(format!("Failed to bind to {addr}: {e}")))
}

/// Serve `/metrics` alone on its own address
async fn run_metrics_listener(state: AppState, addr: String) -> Result<(), AppError> {
    let listener = bind(&addr).await?;
    info!("Metrics listening on http://{}", addr);

    let app = Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Server(e.to_string()))
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let state = create_app_state(&config).await?;

    if let Some(addr) = config.metrics.address() {
        let metrics_state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = run_metrics_listener(metrics_state, addr).await {
                warn!(error = %e, "Metrics listener stopped");
            }
        });
    }

    let http = create_app(state.clone(), config.server.request_timeout());
    let mux = Multiplexer::new(http, MaterialsGrpc::new(state));

    let addr = config.server.address();
    let listener = bind(&addr).await?;
    info!("Serving HTTP and gRPC on {}", addr);

    axum::serve(listener, tower::make::Shared::new(mux))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Server(e.to_string()))?;

    info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grpc::{proto, Rpc, USER_METADATA_KEY};
    use crate::state::test_state;
    use materials_service::memory::MemoryStore;
    use prost::Message;

    fn mux(store: &MemoryStore) -> Multiplexer {
        let state = test_state(store);
        Multiplexer::new(
            create_app(state.clone(), Duration::from_secs(5)),
            MaterialsGrpc::new(state),
        )
    }

    #[tokio::test]
    async fn test_http_requests_reach_the_router() {
        let store = MemoryStore::new();
        let request = http::Request::get("/health").body(Body::empty()).unwrap();
        let response = mux(&store).oneshot(request).await.unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_grpc_requests_reach_the_service() {
        let store = MemoryStore::new();
        let payload = proto::SaveDraftMaterialIn {
            title: "Over the wire".to_string(),
            content: None,
            description: String::new(),
            cover_image_url: String::new(),
            read_time_minutes: 1,
        }
        .encode_to_vec();
        let mut framed = vec![0];
        framed.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        framed.extend_from_slice(&payload);

        let request = http::Request::post(Rpc::SaveDraftMaterial.path())
            .version(http::Version::HTTP_2)
            .header(http::header::CONTENT_TYPE, "application/grpc")
            .header(USER_METADATA_KEY, "alice")
            .body(Body::from(framed))
            .unwrap();
        let response = mux(&store).oneshot(request).await.unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/grpc"
        );
    }

    #[tokio::test]
    async fn test_grpc_content_type_over_http1_goes_to_router() {
        let store = MemoryStore::new();
        let request = http::Request::post(Rpc::SaveDraftMaterial.path())
            .header(http::header::CONTENT_TYPE, "application/grpc")
            .body(Body::empty())
            .unwrap();
        let response = mux(&store).oneshot(request).await.unwrap();
        assert_eq!(response.status(), http::StatusCode::NOT_FOUND);
    }
}
