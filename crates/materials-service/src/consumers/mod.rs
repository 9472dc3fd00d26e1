//! Bus consumers feeding the user projection
//!
//! Each handler decodes one topic's JSON payload and applies it through
//! [`UserProjectionService`](crate::services::UserProjectionService).
//! Outcome rules:
//! - undecodable payloads are logged and acknowledged
//! - invalid events (blank ids) are logged and acknowledged
//! - storage failures leave the entry pending for redelivery

mod user_events;

pub use user_events::{ProjectionHandler, UserEventKind};
