//! Service context - dependency container for services
//!
//! Holds the repositories, transaction manager, event publisher and optional
//! material cache that every service borrows.

use std::sync::Arc;
use std::time::{Duration, Instant};

use materials_common::TopicsConfig;
use materials_core::traits::{EventPublisher, MaterialCache, MaterialRepository, UserRepository};
use materials_core::{RequestContext, TransactionManager, UserId};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// Cheap to clone; every dependency sits behind an `Arc`.
#[derive(Clone)]
pub struct ServiceContext {
    // Persistence
    tx_manager: Arc<dyn TransactionManager>,
    material_repo: Arc<dyn MaterialRepository>,
    user_repo: Arc<dyn UserRepository>,

    // Redis
    publisher: Arc<dyn EventPublisher>,
    cache: Option<Arc<dyn MaterialCache>>,

    topics: TopicsConfig,
    request_timeout: Duration,
}

impl ServiceContext {
    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Persistence ===

    pub fn tx_manager(&self) -> &Arc<dyn TransactionManager> {
        &self.tx_manager
    }

    /// Get the material repository
    pub fn material_repo(&self) -> &dyn MaterialRepository {
        self.material_repo.as_ref()
    }

    /// Get the user projection repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    // === Redis ===

    /// Get the event bus publisher
    pub fn publisher(&self) -> &dyn EventPublisher {
        self.publisher.as_ref()
    }

    /// Material cache, if one is configured
    pub fn cache(&self) -> Option<&dyn MaterialCache> {
        self.cache.as_deref()
    }

    pub fn topics(&self) -> &TopicsConfig {
        &self.topics
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Root context for one request or bus message: pool executor, current
    /// span, optional caller and a deadline `request_timeout` from now.
    pub fn request_context(&self, caller_id: Option<UserId>) -> RequestContext {
        let ctx = RequestContext::new(Arc::clone(&self.tx_manager))
            .with_deadline(Instant::now() + self.request_timeout);
        match caller_id {
            Some(caller_id) => ctx.with_caller(caller_id),
            None => ctx,
        }
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("cache", &self.cache.is_some())
            .field("topics", &self.topics)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    tx_manager: Option<Arc<dyn TransactionManager>>,
    material_repo: Option<Arc<dyn MaterialRepository>>,
    user_repo: Option<Arc<dyn UserRepository>>,
    publisher: Option<Arc<dyn EventPublisher>>,
    cache: Option<Arc<dyn MaterialCache>>,
    topics: Option<TopicsConfig>,
    request_timeout: Duration,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            tx_manager: None,
            material_repo: None,
            user_repo: None,
            publisher: None,
            cache: None,
            topics: None,
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn tx_manager(mut self, manager: Arc<dyn TransactionManager>) -> Self {
        self.tx_manager = Some(manager);
        self
    }

    pub fn material_repo(mut self, repo: Arc<dyn MaterialRepository>) -> Self {
        self.material_repo = Some(repo);
        self
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn cache(mut self, cache: Option<Arc<dyn MaterialCache>>) -> Self {
        self.cache = cache;
        self
    }

    pub fn topics(mut self, topics: TopicsConfig) -> Self {
        self.topics = Some(topics);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Internal` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            tx_manager: self
                .tx_manager
                .ok_or_else(|| ServiceError::internal("tx_manager is required"))?,
            material_repo: self
                .material_repo
                .ok_or_else(|| ServiceError::internal("material_repo is required"))?,
            user_repo: self
                .user_repo
                .ok_or_else(|| ServiceError::internal("user_repo is required"))?,
            publisher: self
                .publisher
                .ok_or_else(|| ServiceError::internal("publisher is required"))?,
            cache: self.cache,
            topics: self
                .topics
                .ok_or_else(|| ServiceError::internal("topics are required"))?,
            request_timeout: self.request_timeout,
        })
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[test]
    fn test_build_requires_dependencies() {
        let err = ServiceContextBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("tx_manager is required"));
    }

    #[test]
    fn test_request_context_carries_caller_and_deadline() {
        let store = MemoryStore::new();
        let ctx = store
            .service_context()
            .request_timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        let caller = UserId::parse("u-1").unwrap();
        let rctx = ctx.request_context(Some(caller.clone()));
        assert_eq!(rctx.caller_id(), Some(&caller));
        assert!(!rctx.in_transaction());

        let deadline = rctx.deadline().unwrap();
        assert!(deadline > Instant::now());
        assert!(deadline <= Instant::now() + Duration::from_secs(5));

        assert!(ctx.request_context(None).caller_id().is_none());
    }
}
