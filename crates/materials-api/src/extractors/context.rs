//! Per-request context extractor

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use materials_core::RequestContext;

use super::caller::{caller_from_headers, Caller};
use crate::response::ApiError;
use crate::state::AppState;

/// The `RequestContext` installed by the tx middleware.
///
/// Routes mounted outside the pipeline get a fresh pool-bound context
/// built from the state instead.
#[derive(Debug, Clone)]
pub struct Ctx(pub RequestContext);

#[async_trait]
impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<RequestContext>() {
            return Ok(Ctx(ctx.clone()));
        }

        let caller = match parts.extensions.get::<Caller>() {
            Some(Caller(caller)) => caller.clone(),
            None => caller_from_headers(&parts.headers),
        };
        let app_state = AppState::from_ref(state);
        Ok(Ctx(app_state.service_context().request_context(caller)))
    }
}
