//! # materials-core
//!
//! Domain layer containing entities, value objects, repository traits, domain events
//! and the per-request context that carries the active transaction.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod context;
pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use context::{tx_execute, Executor, RequestContext, TransactionManager, TransactionSession};
pub use entities::{Like, Material, MaterialFields, UserProfile};
pub use error::{DomainError, ErrorCategory};
pub use events::{
    AvatarUpdatedEvent, MaterialEvent, MaterialEventKind, NicknameUpdatedEvent, UserCreatedEvent,
};
pub use traits::{EventPublisher, MaterialCache, MaterialRepository, RepoResult, UserRepository};
pub use value_objects::{IdParseError, MaterialId, MaterialStatus, UserId};
