//! # materials-api
//!
//! HTTP/JSON surface built with Axum and the equivalent gRPC surface built
//! with tonic, served together on one listener.

pub mod extractors;
pub mod grpc;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;
