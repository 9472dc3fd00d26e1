//! # materials-consumer
//!
//! Runs one consumer-group reader per user topic and feeds each into the
//! user projection.

use std::path::Path;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use materials_cache::{RedisPool, StreamConsumer, StreamConsumerConfig, StreamPublisher};
use materials_common::{AppConfig, AppError, ConsumerConfig, Metrics};
use materials_db::{
    create_pool, run_migrations, DatabaseConfig, PgMaterialRepository, PgTransactionManager,
    PgUserRepository,
};
use materials_service::consumers::ProjectionHandler;
use materials_service::{ServiceContext, ServiceContextBuilder};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Consumers for the three user topics, each in its own group
pub fn projection_consumers(
    redis_url: &str,
    groups: &ConsumerConfig,
    ctx: &ServiceContext,
    metrics: &Metrics,
) -> Vec<StreamConsumer<ProjectionHandler>> {
    let handlers = [
        (
            ProjectionHandler::user_created(ctx.clone(), metrics.clone()),
            &groups.user_created_group,
        ),
        (
            ProjectionHandler::nickname_updated(ctx.clone(), metrics.clone()),
            &groups.nickname_group,
        ),
        (
            ProjectionHandler::avatar_updated(ctx.clone(), metrics.clone()),
            &groups.avatar_group,
        ),
    ];

    handlers
        .into_iter()
        .map(|(handler, group)| {
            let config = StreamConsumerConfig::new(
                redis_url,
                handler.topic(),
                group.as_str(),
                groups.consumer_name.as_str(),
            );
            StreamConsumer::new(config, Arc::new(handler))
        })
        .collect()
}

async fn build_context(config: &AppConfig) -> Result<ServiceContext, AppError> {
    let pool = create_pool(&DatabaseConfig::from(&config.database))
        .await
        .map_err(AppError::database)?;
    run_migrations(&pool, config.database.migrations_dir.as_deref().map(Path::new))
        .await
        .map_err(AppError::database)?;
    info!("PostgreSQL connection established");

    let redis = RedisPool::connect(&config.redis)
        .await
        .map_err(AppError::cache)?;
    info!("Redis connection established");

    ServiceContextBuilder::new()
        .tx_manager(Arc::new(PgTransactionManager::new(pool.clone())))
        .material_repo(Arc::new(PgMaterialRepository::new(pool.clone())))
        .user_repo(Arc::new(PgUserRepository::new(pool)))
        .publisher(Arc::new(StreamPublisher::new(redis)))
        .topics(config.topics.clone())
        .request_timeout(config.server.request_timeout())
        .build()
        .map_err(|e| AppError::Server(e.to_string()))
}

async fn render_metrics(State(metrics): State<Metrics>) -> impl IntoResponse {
    match metrics.render() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, String::new())
        }
    }
}

async fn serve_metrics(
    addr: String,
    metrics: Metrics,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), AppError> {
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Server(format!("Failed to bind to {addr}: {e}")))?;
    info!("Metrics listening on http://{}", addr);

    let app = Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(metrics);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await
        .map_err(|e| AppError::Server(e.to_string()))
}

/// Run every consumer until `shutdown` flips to `true`
pub async fn run(config: AppConfig, shutdown: watch::Receiver<bool>) -> Result<(), AppError> {
    let ctx = build_context(&config).await?;
    let metrics = Metrics::new().map_err(|e| AppError::Server(e.to_string()))?;

    if let Some(addr) = config.metrics.address() {
        let metrics = metrics.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = serve_metrics(addr, metrics, shutdown).await {
                warn!(error = %e, "Metrics listener stopped");
            }
        });
    }

    let consumers = projection_consumers(&config.redis.url, &config.consumer, &ctx, &metrics);
    for consumer in &consumers {
        let c = consumer.config();
        info!(topic = %c.topic, group = %c.group, consumer = %c.consumer_name, "Starting consumer");
    }

    futures::future::join_all(
        consumers
            .into_iter()
            .map(|consumer| consumer.run(shutdown.clone())),
    )
    .await;

    info!("All consumers stopped");
    Ok(())
}
