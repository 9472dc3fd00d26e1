//! Service layer error types
//!
//! Wraps [`DomainError`] and adds the failures that only the service layer
//! can produce. Every variant maps onto one [`ErrorCategory`], which the HTTP
//! and gRPC surfaces translate into a status.

use materials_common::AppError;
use materials_core::{DomainError, ErrorCategory};
use thiserror::Error;

/// Service layer error type
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Domain rule violation or repository failure
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Request payload rejected by field validation
    #[error("validation error: {0}")]
    Validation(String),

    /// Wiring or other internal failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => e.category(),
            Self::Validation(_) => ErrorCategory::InvalidArgument,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        self.category().http_status()
    }

    /// Get the error code for logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to send to a client. Internal detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self.category() {
            ErrorCategory::Internal => "internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Whether a retry could succeed without changing the request
    pub fn is_transient(&self) -> bool {
        matches!(self.category(), ErrorCategory::Internal | ErrorCategory::Cancelled)
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{field} is invalid"),
                })
            })
            .collect();
        messages.sort();
        Self::Validation(messages.join("; "))
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::Validation(msg) => AppError::Domain(DomainError::ValidationError(msg)),
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use materials_core::MaterialId;

    #[test]
    fn test_domain_categories_pass_through() {
        let err = ServiceError::from(DomainError::NotMaterialOwner { action: "publish" });
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "NOT_MATERIAL_OWNER");
        assert_eq!(err.public_message(), "failed to publish: user is not owner");

        let err = ServiceError::from(DomainError::MaterialMissing(MaterialId::new()));
        assert_eq!(err.status_code(), 412);

        let err = ServiceError::from(DomainError::Cancelled);
        assert_eq!(err.status_code(), 499);
        assert!(err.is_transient());
    }

    #[test]
    fn test_validation_error() {
        let err = ServiceError::validation("title too long");
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(!err.is_transient());
    }

    #[test]
    fn test_internal_detail_hidden() {
        let err = ServiceError::from(DomainError::DatabaseError("connection reset".into()));
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.public_message(), "internal server error");
        assert!(err.to_string().contains("connection reset"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_convert_to_app_error() {
        let app: AppError = ServiceError::validation("bad").into();
        assert_eq!(app.status_code(), 400);

        let app: AppError = ServiceError::internal("boom").into();
        assert_eq!(app.status_code(), 500);
    }
}
