//! gRPC surface: `materials.MaterialsService`
//!
//! Messages are prost-derived in [`proto`]; the service is dispatched by
//! hand on the request path and runs the same auth → logging → metrics → tx
//! stages as the HTTP surface.

mod convert;
pub mod proto;
mod service;
mod status;

pub use service::{caller_from_metadata, MaterialsGrpc, Rpc, SERVICE_NAME, USER_METADATA_KEY};
pub use status::{code_for, to_status};
