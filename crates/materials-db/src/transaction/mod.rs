//! Transactions bound to the request context
//!
//! [`PgTransactionManager`] opens [`PgTransaction`]s for `tx_execute`;
//! repositories call [`acquire`] to get a connection that is either the
//! context's open transaction or a fresh pooled connection.

mod connection;
mod manager;

pub use connection::{acquire, DbConnection};
pub use manager::{PgTransaction, PgTransactionManager};
