//! Material read-through cache port

use async_trait::async_trait;

use super::RepoResult;
use crate::entities::Material;
use crate::value_objects::MaterialId;

#[async_trait]
pub trait MaterialCache: Send + Sync {
    async fn get(&self, id: MaterialId) -> RepoResult<Option<Material>>;

    async fn put(&self, material: &Material) -> RepoResult<()>;

    async fn evict(&self, id: MaterialId) -> RepoResult<()>;
}
