//! Redis-backed [`MaterialCache`].
//!
//! Entries are the JSON form of [`Material`] under `material:<uuid>` and
//! expire after the configured TTL. Writers evict after commit, so a stale
//! entry lives at most until the next mutation or the TTL.

use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use materials_core::entities::Material;
use materials_core::error::DomainError;
use materials_core::traits::{MaterialCache, RepoResult};
use materials_core::value_objects::MaterialId;

use crate::pool::{RedisPool, RedisPoolError};

/// Key prefix for cached materials
pub const MATERIAL_KEY_PREFIX: &str = "material:";

/// Material cache on top of the shared Redis pool
#[derive(Debug, Clone)]
pub struct RedisMaterialCache {
    pool: RedisPool,
    ttl: Duration,
}

impl RedisMaterialCache {
    #[must_use]
    pub fn new(pool: RedisPool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    /// Cache key for a material
    #[must_use]
    pub fn key(id: MaterialId) -> String {
        format!("{MATERIAL_KEY_PREFIX}{id}")
    }

    fn ttl_seconds(&self) -> Option<u64> {
        match self.ttl.as_secs() {
            0 => None,
            secs => Some(secs),
        }
    }
}

fn cache_error(err: RedisPoolError) -> DomainError {
    DomainError::CacheError(err.to_string())
}

#[async_trait]
impl MaterialCache for RedisMaterialCache {
    #[instrument(skip(self))]
    async fn get(&self, id: MaterialId) -> RepoResult<Option<Material>> {
        self.pool
            .get_value::<Material>(&Self::key(id))
            .await
            .map_err(cache_error)
    }

    #[instrument(skip(self, material), fields(material_id = %material.id))]
    async fn put(&self, material: &Material) -> RepoResult<()> {
        self.pool
            .set(&Self::key(material.id), material, self.ttl_seconds())
            .await
            .map_err(cache_error)
    }

    #[instrument(skip(self))]
    async fn evict(&self, id: MaterialId) -> RepoResult<()> {
        let removed = self
            .pool
            .delete(&Self::key(id))
            .await
            .map_err(cache_error)?;
        tracing::trace!(material_id = %id, removed, "Material cache entry evicted");
        Ok(())
    }
}
