//! Application state
//!
//! Holds the shared state for both surfaces: the service context, the
//! metrics registry and the readiness probe.

use std::sync::Arc;

use async_trait::async_trait;
use materials_common::Metrics;
use materials_service::ServiceContext;

/// Dependency checks behind `GET /health/ready`
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    async fn database(&self) -> bool;

    async fn redis(&self) -> bool;
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    metrics: Metrics,
    readiness: Arc<dyn ReadinessProbe>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(
        service_context: ServiceContext,
        metrics: Metrics,
        readiness: Arc<dyn ReadinessProbe>,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            metrics,
            readiness,
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn readiness(&self) -> &dyn ReadinessProbe {
        self.readiness.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .field("metrics", &"Metrics")
            .finish()
    }
}

/// Probe with fixed answers
#[cfg(test)]
pub(crate) struct FixedProbe {
    pub database: bool,
    pub redis: bool,
}

#[cfg(test)]
#[async_trait]
impl ReadinessProbe for FixedProbe {
    async fn database(&self) -> bool {
        self.database
    }

    async fn redis(&self) -> bool {
        self.redis
    }
}

/// State over in-memory adapters, for router and gRPC tests
#[cfg(test)]
pub(crate) fn test_state(store: &materials_service::memory::MemoryStore) -> AppState {
    test_state_with_probe(
        store,
        FixedProbe {
            database: true,
            redis: true,
        },
    )
}

#[cfg(test)]
pub(crate) fn test_state_with_probe(
    store: &materials_service::memory::MemoryStore,
    probe: FixedProbe,
) -> AppState {
    let context = store.service_context().build().unwrap();
    AppState::new(context, Metrics::new().unwrap(), Arc::new(probe))
}
