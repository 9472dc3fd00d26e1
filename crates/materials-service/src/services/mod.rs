//! Business logic services
//!
//! Services borrow a [`ServiceContext`] and take a per-request
//! [`materials_core::RequestContext`] on every call.

pub mod context;
pub mod error;
pub mod events;
pub mod material;
pub mod user;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use events::EventProducer;
pub use material::MaterialService;
pub use user::UserProjectionService;
