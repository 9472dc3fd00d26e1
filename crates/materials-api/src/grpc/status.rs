//! Service errors as gRPC statuses

use materials_core::ErrorCategory;
use materials_service::ServiceError;
use tonic::{Code, Status};
use tracing::error;

/// gRPC code for an error category
pub const fn code_for(category: ErrorCategory) -> Code {
    match category {
        ErrorCategory::InvalidArgument => Code::InvalidArgument,
        ErrorCategory::Unauthenticated => Code::Unauthenticated,
        ErrorCategory::PermissionDenied => Code::PermissionDenied,
        ErrorCategory::NotFound => Code::NotFound,
        ErrorCategory::FailedPrecondition => Code::FailedPrecondition,
        ErrorCategory::Cancelled => Code::Cancelled,
        ErrorCategory::Internal => Code::Internal,
    }
}

/// Convert a service error, logging internal detail before it is hidden
pub fn to_status(err: &ServiceError) -> Status {
    let category = err.category();
    if category == ErrorCategory::Internal {
        error!(error = %err, code = err.error_code(), "gRPC call failed");
    }
    Status::new(code_for(category), err.public_message())
}
