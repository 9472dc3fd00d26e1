//! Value objects - immutable domain primitives

mod material_id;
mod material_status;
mod user_id;

pub use material_id::MaterialId;
pub use material_status::MaterialStatus;
pub use user_id::UserId;

/// Error when parsing an identifier from its string form
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    #[error("identifier is empty")]
    Empty,

    #[error("invalid identifier format: {0}")]
    InvalidFormat(String),
}
