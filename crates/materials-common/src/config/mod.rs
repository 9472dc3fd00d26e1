//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, CacheConfig, ConfigError, ConsumerConfig, DatabaseConfig,
    Environment, LoggerConfig, MetricsConfig, RedisConfig, ServerConfig, TopicsConfig,
};
