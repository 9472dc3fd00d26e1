//! # materials-common
//!
//! Shared utilities including configuration, error handling, tracing and metrics.

pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{
    AppConfig, AppSettings, CacheConfig, ConfigError, ConsumerConfig, DatabaseConfig,
    Environment, LoggerConfig, MetricsConfig, RedisConfig, ServerConfig, TopicsConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{
    try_init_tracing, try_init_tracing_with_config, Metrics, TracingConfig, TracingError,
};
