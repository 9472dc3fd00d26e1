//! Request context - caller identity, tracing span, executor and deadline

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::Span;

use super::transaction::{TransactionManager, TransactionSession};
use crate::error::DomainError;
use crate::value_objects::UserId;

/// Where repository calls execute
#[derive(Clone)]
pub enum Executor {
    /// No transaction open; statements run on pooled connections
    Pool(Arc<dyn TransactionManager>),
    /// Statements run inside this open transaction
    Transaction(Arc<dyn TransactionSession>),
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pool(_) => f.write_str("Executor::Pool"),
            Self::Transaction(_) => f.write_str("Executor::Transaction"),
        }
    }
}

/// Per-request context.
///
/// Cheap to clone. Derivation methods return new contexts and leave the
/// original untouched.
#[derive(Clone, Debug)]
pub struct RequestContext {
    caller_id: Option<UserId>,
    span: Span,
    executor: Executor,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Context bound to the pool, with no caller and no deadline
    pub fn new(manager: Arc<dyn TransactionManager>) -> Self {
        Self {
            caller_id: None,
            span: Span::current(),
            executor: Executor::Pool(manager),
            deadline: None,
        }
    }

    pub fn with_caller(mut self, caller_id: UserId) -> Self {
        self.caller_id = Some(caller_id);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Copy of this context running on `executor`
    pub fn with_executor(&self, executor: Executor) -> Self {
        Self {
            executor,
            ..self.clone()
        }
    }

    pub fn caller_id(&self) -> Option<&UserId> {
        self.caller_id.as_ref()
    }

    /// Caller identity, or `Unauthenticated` when the request carried none
    pub fn require_caller(&self) -> Result<&UserId, DomainError> {
        self.caller_id.as_ref().ok_or(DomainError::Unauthenticated)
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The open transaction, if any
    pub fn transaction(&self) -> Option<&Arc<dyn TransactionSession>> {
        match &self.executor {
            Executor::Transaction(session) => Some(session),
            Executor::Pool(_) => None,
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction().is_some()
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
