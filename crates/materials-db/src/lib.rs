//! # materials-db
//!
//! Database layer implementing repository traits with PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! This crate provides PostgreSQL implementations for the repository and
//! transaction ports defined in `materials-core`. It handles:
//!
//! - Connection pool management and schema migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - Repository implementations that run on the pool or on the transaction
//!   carried by the request context
//!
//! ## Usage
//!
//! ```rust,ignore
//! use materials_db::{create_pool, PgMaterialRepository, PgTransactionManager};
//! use materials_core::{tx_execute, RequestContext, MaterialRepository};
//!
//! async fn example(config: &materials_db::DatabaseConfig) -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(config).await?;
//!     let repo = PgMaterialRepository::new(pool.clone());
//!     let ctx = RequestContext::new(std::sync::Arc::new(PgTransactionManager::new(pool)));
//!
//!     let page = repo.list(&ctx, 0, 10).await?;
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;
pub mod transaction;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool, DEFAULT_MIGRATIONS_DIR};
pub use repositories::{PgMaterialRepository, PgUserRepository};
pub use transaction::{PgTransaction, PgTransactionManager};
