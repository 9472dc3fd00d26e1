//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub metrics: MetricsConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub logger: Option<LoggerConfig>,
    pub topics: TopicsConfig,
    pub consumer: ConsumerConfig,
    pub cache: CacheConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Some(Self::Production),
            "staging" | "stage" => Some(Self::Staging),
            "development" | "dev" | "local" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Listener configuration (HTTP and gRPC share one socket)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Per-request deadline
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Prometheus exporter listener. Without a port, metrics are only served on
/// the main listener's `/metrics` route.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub host: String,
    pub port: Option<u16>,
}

impl MetricsConfig {
    #[must_use]
    pub fn address(&self) -> Option<String> {
        self.port.map(|port| format!("{}:{port}", self.host))
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Directory holding SQL migrations; the crate's own directory when unset
    pub migrations_dir: Option<String>,
}

/// Redis configuration (event bus and material cache)
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Remote log sink address, reported at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    pub host: String,
    pub port: u16,
}

/// Event bus topic names
#[derive(Debug, Clone)]
pub struct TopicsConfig {
    // Produced
    pub material_created: String,
    pub material_edited: String,
    pub like_toggled: String,
    pub material_deleted: String,
    // Consumed
    pub user_created: String,
    pub nickname_updated: String,
    pub avatar_updated: String,
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            material_created: "materials.material_created".to_string(),
            material_edited: "materials.material_edited".to_string(),
            like_toggled: "materials.toggle_like".to_string(),
            material_deleted: "materials.material_deleted".to_string(),
            user_created: "user.created".to_string(),
            nickname_updated: "user.nickname_updated".to_string(),
            avatar_updated: "avatar.updated".to_string(),
        }
    }
}

/// Consumer group membership
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub user_created_group: String,
    pub nickname_group: String,
    pub avatar_group: String,
    /// Name of this process within each group
    pub consumer_name: String,
}

/// Material read-through cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl CacheConfig {
    /// A zero TTL disables the cache
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.ttl_secs > 0
    }
}

// Default value functions
fn default_service_name() -> String {
    "materials-service".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_postgres_port() -> u16 {
    5432
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_cache_ttl() -> u64 {
    60
}

fn default_consumer_group() -> String {
    "materials-service".to_string()
}

/// Environment lookup with blank values treated as unset
struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::MissingVar(key))
    }

    fn or_else(&self, key: &str, default: impl FnOnce() -> String) -> String {
        self.get(key).unwrap_or_else(default)
    }

    fn parse<T: FromStr>(&self, key: &'static str) -> Result<Option<T>, ConfigError> {
        self.get(key)
            .map(|raw| {
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(key, raw))
            })
            .transpose()
    }

    fn parse_or<T: FromStr>(&self, key: &'static str, default: fn() -> T) -> Result<T, ConfigError> {
        Ok(self.parse(key)?.unwrap_or_else(default))
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(lookup);
        let topic_defaults = TopicsConfig::default();

        let env = match vars.get("ENV") {
            Some(raw) => Environment::parse(&raw).ok_or(ConfigError::InvalidValue("ENV", raw))?,
            None => Environment::default(),
        };
        let name = vars.or_else("MATERIALS_SERVICE_NAME", default_service_name);

        let database_url = match vars.get("DATABASE_URL") {
            Some(url) => url,
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                vars.required("MATERIALS_SERVICE_POSTGRES_USER")?,
                vars.required("MATERIALS_SERVICE_POSTGRES_PASSWORD")?,
                vars.required("MATERIALS_SERVICE_POSTGRES_HOST")?,
                vars.parse_or("MATERIALS_SERVICE_POSTGRES_PORT", default_postgres_port)?,
                vars.required("MATERIALS_SERVICE_POSTGRES_DB")?,
            ),
        };

        let redis_url = match vars.get("REDIS_URL") {
            Some(url) => url,
            None => format!(
                "redis://{}:{}",
                vars.required("EVENT_BUS_HOST")?,
                vars.parse::<u16>("EVENT_BUS_PORT")?
                    .ok_or(ConfigError::MissingVar("EVENT_BUS_PORT"))?,
            ),
        };

        let logger = match (vars.get("LOGGER_SERVICE_HOST"), vars.parse("LOGGER_SERVICE_PORT")?) {
            (Some(host), Some(port)) => Some(LoggerConfig { host, port }),
            _ => None,
        };

        let consumer_name = vars.or_else("MATERIALS_CONSUMER_NAME", || {
            format!("{name}-{}", std::process::id())
        });

        Ok(Self {
            server: ServerConfig {
                host: vars.or_else("MATERIALS_SERVICE_HOST", default_host),
                port: vars
                    .parse("MATERIALS_SERVICE_PORT")?
                    .ok_or(ConfigError::MissingVar("MATERIALS_SERVICE_PORT"))?,
                request_timeout_secs: vars
                    .parse_or("REQUEST_TIMEOUT_SECS", default_request_timeout)?,
            },
            metrics: MetricsConfig {
                host: vars.or_else("GRAFANA_HOST", default_host),
                port: vars.parse("GRAFANA_PORT")?,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: vars
                    .parse_or("DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: vars
                    .parse_or("DATABASE_MIN_CONNECTIONS", default_min_connections)?,
                migrations_dir: vars.get("DATABASE_MIGRATIONS_DIR"),
            },
            redis: RedisConfig {
                url: redis_url,
                max_connections: vars
                    .parse_or("REDIS_MAX_CONNECTIONS", default_redis_max_connections)?,
            },
            logger,
            topics: TopicsConfig {
                material_created: vars.or_else("MATERIALS_CREATE_MATERIAL", || {
                    topic_defaults.material_created.clone()
                }),
                material_edited: vars.or_else("MATERIALS_EDIT_MATERIAL", || {
                    topic_defaults.material_edited.clone()
                }),
                like_toggled: vars.or_else("MATERIALS_TOGGLE_LIKE", || {
                    topic_defaults.like_toggled.clone()
                }),
                material_deleted: vars.or_else("MATERIALS_DELETE_MATERIAL", || {
                    topic_defaults.material_deleted.clone()
                }),
                user_created: vars
                    .or_else("USER_CREATED_TOPIC", || topic_defaults.user_created.clone()),
                nickname_updated: vars.or_else("USER_NICKNAME_TOPIC", || {
                    topic_defaults.nickname_updated.clone()
                }),
                avatar_updated: vars
                    .or_else("AVATAR_SET_TOPIC", || topic_defaults.avatar_updated.clone()),
            },
            consumer: ConsumerConfig {
                user_created_group: vars
                    .or_else("USER_CREATED_CONSUMER_GROUP", default_consumer_group),
                nickname_group: vars
                    .or_else("USER_NICKNAME_CONSUMER_GROUP", default_consumer_group),
                avatar_group: vars.or_else("AVATAR_CONSUMER_GROUP", default_consumer_group),
                consumer_name,
            },
            cache: CacheConfig {
                ttl_secs: vars.parse_or("MATERIAL_CACHE_TTL_SECS", default_cache_ttl)?,
            },
            app: AppSettings { name, env },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
