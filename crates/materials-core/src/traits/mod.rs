//! Ports - interfaces the domain needs from infrastructure

mod cache;
mod publisher;
mod repositories;

pub use cache::MaterialCache;
pub use publisher::EventPublisher;
pub use repositories::{MaterialRepository, RepoResult, UserRepository};
