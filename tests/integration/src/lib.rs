//! Integration test utilities for the materials service
//!
//! This crate provides helpers for running end-to-end tests against
//! the HTTP and gRPC surfaces of a live server.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
