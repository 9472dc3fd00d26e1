//! PostgreSQL transaction manager and session

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use materials_core::context::{TransactionManager, TransactionSession};
use materials_core::error::DomainError;
use materials_core::traits::RepoResult;

use crate::repositories::map_db_error;

/// Opens transactions on the shared pool
#[derive(Clone)]
pub struct PgTransactionManager {
    pool: PgPool,
}

impl PgTransactionManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManager for PgTransactionManager {
    async fn begin(&self) -> RepoResult<Arc<dyn TransactionSession>> {
        let tx = self.pool.begin().await.map_err(map_db_error)?;
        debug!("transaction started");
        Ok(Arc::new(PgTransaction::new(tx)))
    }
}

/// One open PostgreSQL transaction.
///
/// The slot is emptied by commit or rollback. If the session is dropped while
/// the slot is still full, sqlx rolls the transaction back when the
/// connection returns to the pool.
pub struct PgTransaction {
    inner: Mutex<Option<Transaction<'static, Postgres>>>,
}

impl PgTransaction {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self {
            inner: Mutex::new(Some(tx)),
        }
    }

    /// Lock the transaction for one statement (or a short run of statements)
    pub(crate) async fn lock(&self) -> MutexGuard<'_, Option<Transaction<'static, Postgres>>> {
        self.inner.lock().await
    }
}

#[async_trait]
impl TransactionSession for PgTransaction {
    async fn commit(&self) -> RepoResult<()> {
        let tx = self.inner.lock().await.take();
        match tx {
            Some(tx) => tx.commit().await.map_err(map_db_error),
            None => Err(DomainError::DatabaseError(
                "transaction already finished".to_string(),
            )),
        }
    }

    async fn rollback(&self) -> RepoResult<()> {
        let tx = self.inner.lock().await.take();
        match tx {
            Some(tx) => tx.rollback().await.map_err(map_db_error),
            None => Ok(()),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
