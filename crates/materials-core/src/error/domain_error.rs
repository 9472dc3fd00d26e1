//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{MaterialId, MaterialStatus};

/// Transport-independent error category.
///
/// Both surfaces derive their status codes from this, so an error is
/// reported identically over HTTP and gRPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    InvalidArgument,
    Unauthenticated,
    PermissionDenied,
    NotFound,
    FailedPrecondition,
    Cancelled,
    Internal,
}

impl ErrorCategory {
    /// HTTP status code for this category (499 is the nginx client-closed code)
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidArgument => 400,
            Self::Unauthenticated => 401,
            Self::PermissionDenied => 403,
            Self::NotFound => 404,
            Self::FailedPrecondition => 412,
            Self::Cancelled => 499,
            Self::Internal => 500,
        }
    }
}

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("material does not exist")]
    MaterialNotFound(MaterialId),

    #[error("failed to archive: material already archived or not found")]
    NothingToArchive(MaterialId),

    #[error("failed to delete: material already deleted or not found")]
    NothingToDelete(MaterialId),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("title is required")]
    TitleRequired,

    #[error("material uuid is required")]
    MaterialIdRequired,

    #[error("invalid material uuid: {0}")]
    InvalidMaterialId(String),

    #[error("read time must not be negative: {0}")]
    NegativeReadTime(i32),

    // =========================================================================
    // Authentication / Authorization Errors
    // =========================================================================
    #[error("user UUID is required")]
    Unauthenticated,

    #[error("failed to {action}: user is not owner")]
    NotMaterialOwner { action: &'static str },

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("material does not exist")]
    MaterialMissing(MaterialId),

    #[error("cannot move material from {from} to {to}")]
    InvalidTransition {
        from: MaterialStatus,
        to: MaterialStatus,
    },

    // =========================================================================
    // Cancellation
    // =========================================================================
    #[error("request cancelled or deadline exceeded")]
    Cancelled,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Event bus error: {0}")]
    EventBusError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for logs and metrics labels
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::MaterialNotFound(_) => "UNKNOWN_MATERIAL",
            Self::NothingToArchive(_) => "NOTHING_TO_ARCHIVE",
            Self::NothingToDelete(_) => "NOTHING_TO_DELETE",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::TitleRequired => "TITLE_REQUIRED",
            Self::MaterialIdRequired => "MATERIAL_ID_REQUIRED",
            Self::InvalidMaterialId(_) => "INVALID_MATERIAL_ID",
            Self::NegativeReadTime(_) => "NEGATIVE_READ_TIME",

            // Auth
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::NotMaterialOwner { .. } => "NOT_MATERIAL_OWNER",

            // Business Rules
            Self::MaterialMissing(_) => "MATERIAL_MISSING",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",

            Self::Cancelled => "CANCELLED",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::EventBusError(_) => "EVENT_BUS_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Map to the transport-independent category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MaterialNotFound(_)
            | Self::NothingToArchive(_)
            | Self::NothingToDelete(_) => ErrorCategory::NotFound,

            Self::ValidationError(_)
            | Self::TitleRequired
            | Self::MaterialIdRequired
            | Self::InvalidMaterialId(_)
            | Self::NegativeReadTime(_) => ErrorCategory::InvalidArgument,

            Self::Unauthenticated => ErrorCategory::Unauthenticated,
            Self::NotMaterialOwner { .. } => ErrorCategory::PermissionDenied,

            Self::MaterialMissing(_) | Self::InvalidTransition { .. } => {
                ErrorCategory::FailedPrecondition
            }

            Self::Cancelled => ErrorCategory::Cancelled,

            Self::DatabaseError(_)
            | Self::CacheError(_)
            | Self::EventBusError(_)
            | Self::InternalError(_) => ErrorCategory::Internal,
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        self.category() == ErrorCategory::InvalidArgument
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotMaterialOwner { .. })
    }

    /// Infrastructure failures carry backend detail that must not reach clients
    pub fn is_internal(&self) -> bool {
        self.category() == ErrorCategory::Internal
    }
}
