//! Caller identity
//!
//! Authentication happens upstream; the gateway forwards the authenticated
//! user's id in a header and this service trusts it.

use axum::http::HeaderMap;
use materials_core::UserId;

/// Canonical identity header
pub const USER_HEADER: &str = "x-user-uuid";

/// Older clients still send this one
pub const LEGACY_USER_HEADER: &str = "x-user-id";

/// Caller resolved by the auth middleware, `None` on public routes
#[derive(Debug, Clone, Default)]
pub struct Caller(pub Option<UserId>);

/// Read the caller from the canonical header, falling back to the legacy one.
/// Blank or non-UTF-8 values count as absent.
pub fn caller_from_headers(headers: &HeaderMap) -> Option<UserId> {
    [USER_HEADER, LEGACY_USER_HEADER].iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| UserId::parse(v).ok())
    })
}
