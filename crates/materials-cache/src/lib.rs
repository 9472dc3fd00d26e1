//! # materials-cache
//!
//! Redis layer for the materials service.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Material Cache**: Read-through cache for single-material lookups
//! - **Event Bus**: Redis Streams publisher and consumer-group reader
//!
//! ## Example
//!
//! ```ignore
//! use materials_cache::{RedisPool, RedisPoolConfig, StreamPublisher};
//! use materials_core::EventPublisher;
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let publisher = StreamPublisher::new(pool.clone());
//! publisher.publish("materials.toggle_like", material_id, &payload).await?;
//! ```

pub mod cache;
pub mod pool;
pub mod streams;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};

// Re-export cache types
pub use cache::{RedisMaterialCache, MATERIAL_KEY_PREFIX};

// Re-export stream types
pub use streams::{
    Delivery, StreamConsumer, StreamConsumerConfig, StreamHandler, StreamMessage, StreamPublisher,
    FIELD_KEY, FIELD_PAYLOAD,
};
