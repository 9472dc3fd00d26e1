//! Axum extractors for request handling
//!
//! Caller identity, the per-request context and JSON bodies.

mod caller;
mod context;
mod json;

pub use caller::{caller_from_headers, Caller, LEGACY_USER_HEADER, USER_HEADER};
pub use context::Ctx;
pub use json::JsonBody;
