//! Material read-through cache

mod material_cache;

pub use material_cache::{RedisMaterialCache, MATERIAL_KEY_PREFIX};
