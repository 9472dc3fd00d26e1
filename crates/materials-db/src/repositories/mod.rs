//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in materials-core.

mod error;
mod material;
mod user;

pub use error::map_db_error;
pub use material::PgMaterialRepository;
pub use user::PgUserRepository;
