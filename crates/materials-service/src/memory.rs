//! In-memory adapters for every port the services use.
//!
//! Backs the service, router and consumer test suites without
//! PostgreSQL or Redis. A transaction holds the store's writer lock from
//! `begin` until it commits, rolls back or is dropped, and restores the
//! snapshot taken at `begin` unless it commits. Transactions therefore run
//! one at a time.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use materials_common::TopicsConfig;
use materials_core::entities::{Like, Material, MaterialFields, UserProfile};
use materials_core::traits::{
    EventPublisher, MaterialCache, MaterialRepository, RepoResult, UserRepository,
};
use materials_core::{
    DomainError, MaterialId, MaterialStatus, RequestContext, TransactionManager,
    TransactionSession, UserId,
};

use crate::services::ServiceContextBuilder;

#[derive(Debug, Clone, Default)]
struct State {
    materials: HashMap<MaterialId, Material>,
    likes: HashMap<(MaterialId, UserId), Like>,
    users: HashMap<UserId, UserProfile>,
}

/// Transaction counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxJournal {
    pub begun: usize,
    pub committed: usize,
    pub rolled_back: usize,
}

/// Shared in-memory store; clones see the same data
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    writer: Arc<AsyncMutex<()>>,
    journal: Arc<Mutex<TxJournal>>,
    publisher: Arc<CollectingPublisher>,
    cache: Arc<MemoryCache>,
    users_down: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-wired with this store's adapters and default topics
    pub fn service_context(&self) -> ServiceContextBuilder {
        ServiceContextBuilder::new()
            .tx_manager(Arc::new(MemoryTxManager {
                store: self.clone(),
            }))
            .material_repo(Arc::new(MemoryMaterialRepository {
                store: self.clone(),
            }))
            .user_repo(Arc::new(MemoryUserRepository {
                store: self.clone(),
            }))
            .publisher(self.publisher.clone())
            .cache(Some(self.cache.clone() as Arc<dyn MaterialCache>))
            .topics(TopicsConfig::default())
    }

    pub fn publisher(&self) -> &CollectingPublisher {
        &self.publisher
    }

    pub fn cache(&self) -> &MemoryCache {
        &self.cache
    }

    pub fn journal(&self) -> TxJournal {
        *self.journal.lock()
    }

    /// Stored row, soft-deleted or not
    pub fn material(&self, id: MaterialId) -> Option<Material> {
        self.state.lock().materials.get(&id).cloned()
    }

    pub fn insert_material(&self, material: Material) {
        self.state.lock().materials.insert(material.id, material);
    }

    /// Number of like rows for a material
    pub fn like_rows(&self, id: MaterialId) -> usize {
        self.state
            .lock()
            .likes
            .keys()
            .filter(|(material_id, _)| *material_id == id)
            .count()
    }

    pub fn user(&self, id: &UserId) -> Option<UserProfile> {
        self.state.lock().users.get(id).cloned()
    }

    pub fn user_count(&self) -> usize {
        self.state.lock().users.len()
    }

    /// Make every user repository call fail with a database error
    pub fn set_users_unavailable(&self, down: bool) {
        self.users_down.store(down, Ordering::SeqCst);
    }
}

fn check_deadline(ctx: &RequestContext) -> RepoResult<()> {
    if ctx.is_expired() {
        return Err(DomainError::Cancelled);
    }
    Ok(())
}

// ============================================================================
// Transactions
// ============================================================================

struct MemoryTxManager {
    store: MemoryStore,
}

#[async_trait]
impl TransactionManager for MemoryTxManager {
    async fn begin(&self) -> RepoResult<Arc<dyn TransactionSession>> {
        let writer = Arc::clone(&self.store.writer).lock_owned().await;
        let snapshot = self.store.state.lock().clone();
        self.store.journal.lock().begun += 1;
        Ok(Arc::new(MemorySession {
            store: self.store.clone(),
            snapshot: Mutex::new(Some(snapshot)),
            writer: Mutex::new(Some(writer)),
        }))
    }
}

struct MemorySession {
    store: MemoryStore,
    snapshot: Mutex<Option<State>>,
    writer: Mutex<Option<OwnedMutexGuard<()>>>,
}

impl MemorySession {
    fn restore(&self) -> bool {
        let restored = match self.snapshot.lock().take() {
            Some(snapshot) => {
                *self.store.state.lock() = snapshot;
                true
            }
            None => false,
        };
        self.release();
        restored
    }

    fn release(&self) {
        self.writer.lock().take();
    }
}

#[async_trait]
impl TransactionSession for MemorySession {
    async fn commit(&self) -> RepoResult<()> {
        self.snapshot.lock().take();
        self.store.journal.lock().committed += 1;
        self.release();
        Ok(())
    }

    async fn rollback(&self) -> RepoResult<()> {
        if self.restore() {
            self.store.journal.lock().rolled_back += 1;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        if self.restore() {
            self.store.journal.lock().rolled_back += 1;
        }
    }
}

// ============================================================================
// Repositories
// ============================================================================

struct MemoryMaterialRepository {
    store: MemoryStore,
}

impl MemoryMaterialRepository {
    fn with_live<T>(&self, id: MaterialId, f: impl FnOnce(&mut Material) -> T) -> Option<T> {
        let mut state = self.store.state.lock();
        state
            .materials
            .get_mut(&id)
            .filter(|m| m.deleted_at.is_none())
            .map(f)
    }
}

/// Wall-clock stamp strictly after `previous`
fn next_stamp(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match previous {
        Some(prev) if prev >= now => prev + Duration::microseconds(1),
        _ => now,
    }
}

#[async_trait]
impl MaterialRepository for MemoryMaterialRepository {
    async fn save_draft(&self, ctx: &RequestContext, material: &Material) -> RepoResult<()> {
        check_deadline(ctx)?;
        self.store.insert_material(material.clone());
        Ok(())
    }

    async fn find_by_id(&self, ctx: &RequestContext, id: MaterialId) -> RepoResult<Option<Material>> {
        check_deadline(ctx)?;
        Ok(self.with_live(id, |m| m.clone()))
    }

    async fn list(&self, ctx: &RequestContext, offset: i64, limit: i64) -> RepoResult<Vec<Material>> {
        check_deadline(ctx)?;
        let mut live: Vec<Material> = self
            .store
            .state
            .lock()
            .materials
            .values()
            .filter(|m| m.deleted_at.is_none())
            .cloned()
            .collect();
        live.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        Ok(live
            .into_iter()
            .skip(usize::try_from(offset.max(0)).unwrap_or(usize::MAX))
            .take(usize::try_from(limit.clamp(1, 100)).unwrap_or(100))
            .collect())
    }

    async fn get_owner(&self, ctx: &RequestContext, id: MaterialId) -> RepoResult<Option<UserId>> {
        check_deadline(ctx)?;
        Ok(self.with_live(id, |m| m.owner_id.clone()))
    }

    async fn exists(&self, ctx: &RequestContext, id: MaterialId) -> RepoResult<bool> {
        check_deadline(ctx)?;
        Ok(self.with_live(id, |_| ()).is_some())
    }

    async fn lock(&self, ctx: &RequestContext, id: MaterialId) -> RepoResult<Option<Material>> {
        // Yield once, as a row-lock wait would
        tokio::task::yield_now().await;
        self.find_by_id(ctx, id).await
    }

    async fn edit(
        &self,
        ctx: &RequestContext,
        id: MaterialId,
        fields: &MaterialFields,
    ) -> RepoResult<Option<Material>> {
        check_deadline(ctx)?;
        Ok(self.with_live(id, |m| {
            let edited_at = next_stamp(m.edited_at);
            m.apply(fields.clone());
            m.edited_at = Some(edited_at);
            m.clone()
        }))
    }

    async fn publish(&self, ctx: &RequestContext, id: MaterialId) -> RepoResult<Option<Material>> {
        check_deadline(ctx)?;
        Ok(self
            .with_live(id, |m| {
                (m.status == MaterialStatus::Draft).then(|| {
                    m.status = MaterialStatus::Published;
                    m.published_at = Some(Utc::now());
                    m.clone()
                })
            })
            .flatten())
    }

    async fn archive(&self, ctx: &RequestContext, id: MaterialId) -> RepoResult<bool> {
        check_deadline(ctx)?;
        Ok(self
            .with_live(id, |m| {
                if m.archived_at.is_some() {
                    return false;
                }
                m.status = MaterialStatus::Archived;
                m.archived_at = Some(Utc::now());
                true
            })
            .unwrap_or(false))
    }

    async fn soft_delete(
        &self,
        ctx: &RequestContext,
        id: MaterialId,
    ) -> RepoResult<Option<DateTime<Utc>>> {
        check_deadline(ctx)?;
        Ok(self.with_live(id, |m| {
            let now = Utc::now();
            m.deleted_at = Some(now);
            now
        }))
    }

    async fn check_like(
        &self,
        ctx: &RequestContext,
        material_id: MaterialId,
        user_id: &UserId,
    ) -> RepoResult<bool> {
        check_deadline(ctx)?;
        Ok(self
            .store
            .state
            .lock()
            .likes
            .contains_key(&(material_id, user_id.clone())))
    }

    async fn add_like(&self, ctx: &RequestContext, like: &Like) -> RepoResult<()> {
        check_deadline(ctx)?;
        self.store
            .state
            .lock()
            .likes
            .entry((like.material_id, like.user_id.clone()))
            .or_insert_with(|| like.clone());
        Ok(())
    }

    async fn remove_like(
        &self,
        ctx: &RequestContext,
        material_id: MaterialId,
        user_id: &UserId,
    ) -> RepoResult<()> {
        check_deadline(ctx)?;
        self.store
            .state
            .lock()
            .likes
            .remove(&(material_id, user_id.clone()));
        Ok(())
    }

    async fn get_likes_count(&self, ctx: &RequestContext, material_id: MaterialId) -> RepoResult<i32> {
        check_deadline(ctx)?;
        i32::try_from(self.store.like_rows(material_id))
            .map_err(|_| DomainError::DatabaseError("like count out of range".to_string()))
    }

    async fn update_likes_count(
        &self,
        ctx: &RequestContext,
        material_id: MaterialId,
        count: i32,
    ) -> RepoResult<()> {
        check_deadline(ctx)?;
        if let Some(m) = self.store.state.lock().materials.get_mut(&material_id) {
            m.likes_count = count;
        }
        Ok(())
    }
}

struct MemoryUserRepository {
    store: MemoryStore,
}

impl MemoryUserRepository {
    fn available(&self) -> RepoResult<()> {
        if self.store.users_down.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("users table unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &UserProfile) -> RepoResult<bool> {
        self.available()?;
        let mut state = self.store.state.lock();
        if state.users.contains_key(&user.id) {
            return Ok(false);
        }
        state.users.insert(user.id.clone(), user.clone());
        Ok(true)
    }

    async fn update_nickname(&self, id: &UserId, nickname: &str) -> RepoResult<bool> {
        self.available()?;
        Ok(match self.store.state.lock().users.get_mut(id) {
            Some(user) => {
                user.nickname = nickname.to_string();
                true
            }
            None => false,
        })
    }

    async fn update_avatar(&self, id: &UserId, avatar_link: &str) -> RepoResult<bool> {
        self.available()?;
        Ok(match self.store.state.lock().users.get_mut(id) {
            Some(user) => {
                user.avatar_link = avatar_link.to_string();
                true
            }
            None => false,
        })
    }

    async fn find_by_id(&self, id: &UserId) -> RepoResult<Option<UserProfile>> {
        self.available()?;
        Ok(self.store.user(id))
    }
}

// ============================================================================
// Event bus and cache
// ============================================================================

/// One recorded publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedEvent {
    pub topic: String,
    pub key: String,
    pub payload: String,
}

impl PublishedEvent {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.payload).unwrap_or(serde_json::Value::Null)
    }
}

/// Records every event instead of sending it
#[derive(Debug, Default)]
pub struct CollectingPublisher {
    published: Mutex<Vec<PublishedEvent>>,
    fail_next: AtomicBool,
}

impl CollectingPublisher {
    pub fn published(&self) -> Vec<PublishedEvent> {
        self.published.lock().clone()
    }

    pub fn on_topic(&self, topic: &str) -> Vec<PublishedEvent> {
        self.published
            .lock()
            .iter()
            .filter(|e| e.topic == topic)
            .cloned()
            .collect()
    }

    /// Fail the next publish call
    pub fn fail_next(&self, fail: bool) {
        self.fail_next.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventPublisher for CollectingPublisher {
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> RepoResult<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(DomainError::EventBusError("bus unavailable".to_string()));
        }
        self.published.lock().push(PublishedEvent {
            topic: topic.to_string(),
            key: key.to_string(),
            payload: payload.to_string(),
        });
        Ok(())
    }
}

/// Map-backed material cache
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<MaterialId, Material>>,
    broken: AtomicBool,
}

impl MemoryCache {
    pub fn contains(&self, id: MaterialId) -> bool {
        self.entries.lock().contains_key(&id)
    }

    pub fn insert(&self, material: Material) {
        self.entries.lock().insert(material.id, material);
    }

    /// Make every cache call fail
    pub fn set_broken(&self, broken: bool) {
        self.broken.store(broken, Ordering::SeqCst);
    }

    fn check(&self) -> RepoResult<()> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(DomainError::CacheError("cache unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MaterialCache for MemoryCache {
    async fn get(&self, id: MaterialId) -> RepoResult<Option<Material>> {
        self.check()?;
        Ok(self.entries.lock().get(&id).cloned())
    }

    async fn put(&self, material: &Material) -> RepoResult<()> {
        self.check()?;
        self.insert(material.clone());
        Ok(())
    }

    async fn evict(&self, id: MaterialId) -> RepoResult<()> {
        self.check()?;
        self.entries.lock().remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use materials_core::tx_execute;

    fn draft(owner: &str) -> Material {
        Material::new_draft(
            MaterialId::new(),
            UserId::parse(owner).unwrap(),
            MaterialFields {
                title: "T".to_string(),
                ..MaterialFields::default()
            },
        )
    }

    #[tokio::test]
    async fn test_rollback_restores_snapshot() {
        let store = MemoryStore::new();
        let ctx = store.service_context().build().unwrap();
        let rctx = ctx.request_context(None);
        let material = draft("owner");
        let id = material.id;

        let result: Result<(), DomainError> = tx_execute(&rctx, |tx| {
            let repo = ctx.material_repo();
            async move {
                repo.save_draft(&tx, &material).await?;
                Err(DomainError::InternalError("abort".to_string()))
            }
        })
        .await;

        assert!(result.is_err());
        assert!(store.material(id).is_none());
        assert_eq!(
            store.journal(),
            TxJournal {
                begun: 1,
                committed: 0,
                rolled_back: 1
            }
        );
    }

    #[tokio::test]
    async fn test_dropped_session_rolls_back() {
        let store = MemoryStore::new();
        let manager = MemoryTxManager {
            store: store.clone(),
        };
        let session = manager.begin().await.unwrap();
        store.insert_material(draft("owner"));
        drop(session);

        assert_eq!(store.state.lock().materials.len(), 0);
        assert_eq!(store.journal().rolled_back, 1);
    }

    #[tokio::test]
    async fn test_transactions_run_one_at_a_time() {
        let store = MemoryStore::new();
        let manager = MemoryTxManager {
            store: store.clone(),
        };

        let first = manager.begin().await.unwrap();
        let waiting =
            tokio::time::timeout(std::time::Duration::from_millis(50), manager.begin()).await;
        assert!(waiting.is_err());

        first.commit().await.unwrap();
        let second =
            tokio::time::timeout(std::time::Duration::from_millis(50), manager.begin()).await;
        assert!(second.is_ok());
    }

    #[test]
    fn test_next_stamp_strictly_increases() {
        let future = Utc::now() + Duration::seconds(5);
        assert!(next_stamp(Some(future)) > future);
        assert!(next_stamp(None) <= Utc::now());
    }
}
