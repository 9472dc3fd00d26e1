//! # materials-service
//!
//! Application layer: the material lifecycle engine, post-commit event
//! production, the user projection and the bus consumers that feed it.

pub mod consumers;
pub mod dto;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod services;

pub use services::{
    EventProducer, MaterialService, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult, UserProjectionService,
};
