//! HTTP request handlers
//!
//! Thin adapters: extract, call the service, wrap the result.

pub mod health;
pub mod materials;
pub mod metrics;
