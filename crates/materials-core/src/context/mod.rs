//! Per-request context and transaction propagation
//!
//! A [`RequestContext`] is built once per inbound request (or bus message) and
//! threaded through services into repositories. Its executor slot decides where
//! SQL runs: against the shared pool, or inside a transaction opened by
//! [`tx_execute`].

mod request_context;
mod transaction;

pub use request_context::{Executor, RequestContext};
pub use transaction::{tx_execute, TransactionManager, TransactionSession};
