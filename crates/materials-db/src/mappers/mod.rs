//! Entity to model mappers
//!
//! Conversions between domain entities (materials-core) and database models.
//! Rows are trusted less than entities: string columns that carry domain
//! values are re-validated on the way in.

mod material;
mod user;

pub use material::MaterialInsert;
