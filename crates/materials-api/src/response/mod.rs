//! Response types and error handling for API endpoints
//!
//! Every failure leaves the HTTP surface as `{"code": <status>, "message": "..."}`.

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use materials_common::ErrorResponse;
use materials_core::DomainError;
use materials_service::ServiceError;
use thiserror::Error;
use tracing::error;

/// API error type for consistent error responses
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Service(#[from] ServiceError),

    /// The body was not JSON or did not match the request shape
    #[error("invalid request body")]
    InvalidBody(String),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            Self::Service(e) => e.status_code(),
            Self::InvalidBody(_) => 400,
            Self::Internal(_) => 500,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get error code for logs
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Service(e) => e.error_code(),
            Self::InvalidBody(_) => "INVALID_BODY",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to return to the client
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Service(e) => e.public_message(),
            Self::InvalidBody(_) => self.to_string(),
            Self::Internal(_) => "internal server error".to_string(),
        }
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    pub fn invalid_body(detail: impl Into<String>) -> Self {
        Self::InvalidBody(detail.into())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Service(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(error = ?self, code = self.error_code(), "Server error occurred");
        } else if let Self::InvalidBody(detail) = &self {
            tracing::debug!(detail = %detail, "Rejected request body");
        }

        let body = ErrorResponse::new(status.as_u16(), self.public_message());
        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

/// Readable text of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Turn a handler panic into a 500 with the usual error body
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    ApiError::internal(anyhow::anyhow!(
        "handler panicked: {}",
        panic_message(payload.as_ref())
    ))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use materials_core::MaterialId;

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            ApiError::from(DomainError::Unauthenticated).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::invalid_body("EOF").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(DomainError::MaterialMissing(MaterialId::new())).status_code(),
            StatusCode::PRECONDITION_FAILED
        );
        assert_eq!(ApiError::from(DomainError::Cancelled).status_code().as_u16(), 499);
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = ApiError::from(DomainError::DatabaseError("connection reset".into()));
        assert_eq!(err.public_message(), "internal server error");

        let err = ApiError::invalid_body("expected value at line 1");
        assert_eq!(err.public_message(), "invalid request body");
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::from(DomainError::NotMaterialOwner { action: "publish" })
            .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, ErrorResponse::new(403, "failed to publish: user is not owner"));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(format!("bad {}", 7));
        assert_eq!(panic_message(payload.as_ref()), "bad 7");
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
