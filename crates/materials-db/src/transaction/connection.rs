//! Context-aware connection acquisition

use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tokio::sync::MutexGuard;

use materials_core::context::RequestContext;
use materials_core::error::DomainError;
use materials_core::traits::RepoResult;

use super::manager::PgTransaction;
use crate::repositories::map_db_error;

/// A connection for one repository call
pub enum DbConnection<'a> {
    /// Pooled connection, autocommit
    Pooled(PoolConnection<Postgres>),
    /// The context's open transaction, held for the duration of the call
    Tx(MutexGuard<'a, Option<Transaction<'static, Postgres>>>),
}

impl DbConnection<'_> {
    /// The underlying connection to run statements on
    pub fn executor(&mut self) -> RepoResult<&mut PgConnection> {
        match self {
            Self::Pooled(conn) => Ok(&mut **conn),
            Self::Tx(guard) => guard.as_deref_mut().ok_or_else(|| {
                DomainError::DatabaseError("transaction already finished".to_string())
            }),
        }
    }
}

/// Connection for a repository call made under `ctx`
pub async fn acquire<'a>(pool: &PgPool, ctx: &'a RequestContext) -> RepoResult<DbConnection<'a>> {
    if ctx.is_expired() {
        return Err(DomainError::Cancelled);
    }

    match ctx.transaction() {
        Some(session) => {
            let tx = session
                .as_any()
                .downcast_ref::<PgTransaction>()
                .ok_or_else(|| {
                    DomainError::InternalError(
                        "transaction was not opened by the PostgreSQL manager".to_string(),
                    )
                })?;
            Ok(DbConnection::Tx(tx.lock().await))
        }
        None => pool
            .acquire()
            .await
            .map(DbConnection::Pooled)
            .map_err(map_db_error),
    }
}
