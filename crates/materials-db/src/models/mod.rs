//! Database models - SQLx-compatible structs for PostgreSQL tables

mod material;
mod user;

pub use material::MaterialModel;
pub use user::UserModel;
