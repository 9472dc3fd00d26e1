//! Error handling utilities for repositories

use materials_core::error::DomainError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    match e {
        SqlxError::PoolTimedOut => {
            DomainError::DatabaseError("timed out waiting for a connection".to_string())
        }
        other => DomainError::DatabaseError(other.to_string()),
    }
}

/// Narrow a COUNT(*) result to the entity's counter width
pub fn count_to_i32(count: i64) -> Result<i32, DomainError> {
    i32::try_from(count)
        .map_err(|_| DomainError::DatabaseError(format!("count out of range: {count}")))
}
