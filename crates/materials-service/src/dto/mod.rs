//! Data transfer objects shared by the HTTP and gRPC surfaces
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Pagination normalisation for list queries
//! - Mappers between domain entities and DTOs

pub mod mappers;
pub mod pagination;
pub mod requests;
pub mod responses;

pub use pagination::{ListMaterialsQuery, Pagination};
pub use requests::{
    EditMaterialRequest, MaterialRefRequest, MaterialUuidRequest, SaveDraftMaterialRequest,
};
pub use responses::{
    EmptyResponse, HealthChecks, HealthResponse, MaterialListResponse, MaterialResponse,
    MaterialView, ReadinessResponse, SaveDraftMaterialResponse, ToggleLikeResponse,
};
