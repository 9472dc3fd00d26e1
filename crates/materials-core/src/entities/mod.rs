//! Domain entities - core business objects

mod like;
mod material;
mod user;

pub use like::Like;
pub use material::{Material, MaterialFields};
pub use user::UserProfile;
