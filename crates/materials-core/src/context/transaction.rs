//! Transaction ports and the propagation primitive

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::request_context::{Executor, RequestContext};
use crate::error::DomainError;
use crate::traits::RepoResult;

/// Opens transactions against the backing store
#[async_trait]
pub trait TransactionManager: Send + Sync {
    async fn begin(&self) -> RepoResult<Arc<dyn TransactionSession>>;
}

/// One open transaction.
///
/// Dropping a session that was neither committed nor rolled back must roll it
/// back; that is what makes cancelled requests leave no partial writes.
#[async_trait]
pub trait TransactionSession: Any + Send + Sync {
    async fn commit(&self) -> RepoResult<()>;

    async fn rollback(&self) -> RepoResult<()>;

    /// Downcast hook for the concrete store that created this session
    fn as_any(&self) -> &dyn Any;
}

/// Run `f` inside a transaction.
///
/// If `ctx` already carries a transaction, `f` joins it and commit/rollback
/// is left to the outer owner. Otherwise a new transaction is opened, `f`
/// receives a child context bound to it, and the transaction is committed when
/// `f` returns `Ok` and rolled back when it returns `Err`. The caller's `ctx`
/// is never modified.
pub async fn tx_execute<T, E, F, Fut>(ctx: &RequestContext, f: F) -> Result<T, E>
where
    F: FnOnce(RequestContext) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: From<DomainError>,
{
    let manager = match ctx.executor() {
        Executor::Transaction(_) => return f(ctx.clone()).await,
        Executor::Pool(manager) => Arc::clone(manager),
    };

    let session = manager.begin().await?;
    let tx_ctx = ctx.with_executor(Executor::Transaction(Arc::clone(&session)));

    match f(tx_ctx).await {
        Ok(value) => {
            session.commit().await?;
            debug!("transaction committed");
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = session.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}
