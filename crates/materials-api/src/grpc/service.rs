//! Hand-written tonic server for `materials.MaterialsService`

use std::convert::Infallible;
use std::future::Future;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::body::Body;
use futures::FutureExt;
use materials_common::Metrics;
use materials_core::{DomainError, RequestContext, UserId};
use materials_service::{MaterialService, ServiceError};
use tonic::metadata::MetadataMap;
use tonic::server::{Grpc, NamedService, UnaryService};
use tonic::{Code, Status};
use tonic_prost::ProstCodec;
use tower::Service;
use tracing::{error, info, info_span, warn, Instrument, Span};

use super::proto;
use super::status::to_status;
use crate::response::panic_message;
use crate::state::AppState;

/// Fully qualified service name
pub const SERVICE_NAME: &str = "materials.MaterialsService";

/// Metadata key carrying the caller id
pub const USER_METADATA_KEY: &str = "uuid";

type BoxFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'static>>;

/// The unary methods of the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rpc {
    SaveDraftMaterial,
    PublishMaterial,
    EditMaterial,
    ToggleLike,
    ArchivedMaterial,
    DeleteMaterial,
    GetAllMaterials,
    GetMaterial,
}

impl Rpc {
    pub const ALL: [Rpc; 8] = [
        Rpc::SaveDraftMaterial,
        Rpc::PublishMaterial,
        Rpc::EditMaterial,
        Rpc::ToggleLike,
        Rpc::ArchivedMaterial,
        Rpc::DeleteMaterial,
        Rpc::GetAllMaterials,
        Rpc::GetMaterial,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Rpc::SaveDraftMaterial => "SaveDraftMaterial",
            Rpc::PublishMaterial => "PublishMaterial",
            Rpc::EditMaterial => "EditMaterial",
            Rpc::ToggleLike => "ToggleLike",
            Rpc::ArchivedMaterial => "ArchivedMaterial",
            Rpc::DeleteMaterial => "DeleteMaterial",
            Rpc::GetAllMaterials => "GetAllMaterials",
            Rpc::GetMaterial => "GetMaterial",
        }
    }

    /// `/materials.MaterialsService/<Method>`
    pub fn path(self) -> String {
        format!("/{SERVICE_NAME}/{}", self.name())
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let method = path
            .strip_prefix('/')?
            .strip_prefix(SERVICE_NAME)?
            .strip_prefix('/')?;
        Self::ALL.into_iter().find(|rpc| rpc.name() == method)
    }

    /// Reads that accept anonymous callers
    pub const fn is_public(self) -> bool {
        matches!(self, Rpc::GetAllMaterials | Rpc::GetMaterial)
    }

    fn metric_name(self) -> String {
        Metrics::metric_name("POST", &self.path())
    }
}

/// Caller id from metadata: exactly one non-blank `uuid` value
pub fn caller_from_metadata(metadata: &MetadataMap) -> Option<UserId> {
    let mut values = metadata.get_all(USER_METADATA_KEY).iter();
    let first = values.next()?;
    if values.next().is_some() {
        return None;
    }
    first.to_str().ok().and_then(|v| UserId::parse(v).ok())
}

/// gRPC service over the shared application state
#[derive(Clone, Debug)]
pub struct MaterialsGrpc {
    state: AppState,
}

impl MaterialsGrpc {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl NamedService for MaterialsGrpc {
    const NAME: &'static str = SERVICE_NAME;
}

impl Service<http::Request<Body>> for MaterialsGrpc {
    type Response = http::Response<tonic::body::Body>;
    type Error = Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<Body>) -> Self::Future {
        let state = self.state.clone();
        let Some(rpc) = Rpc::from_path(req.uri().path()) else {
            return Box::pin(async { Ok(unimplemented()) });
        };

        match rpc {
            Rpc::SaveDraftMaterial => Box::pin(unary(state, rpc, req, save_draft_material)),
            Rpc::PublishMaterial => Box::pin(unary(state, rpc, req, publish_material)),
            Rpc::EditMaterial => Box::pin(unary(state, rpc, req, edit_material)),
            Rpc::ToggleLike => Box::pin(unary(state, rpc, req, toggle_like)),
            Rpc::ArchivedMaterial => Box::pin(unary(state, rpc, req, archived_material)),
            Rpc::DeleteMaterial => Box::pin(unary(state, rpc, req, delete_material)),
            Rpc::GetAllMaterials => Box::pin(unary(state, rpc, req, get_all_materials)),
            Rpc::GetMaterial => Box::pin(unary(state, rpc, req, get_material)),
        }
    }
}

fn unimplemented() -> http::Response<tonic::body::Body> {
    let mut response = http::Response::new(tonic::body::Body::default());
    let headers = response.headers_mut();
    headers.insert(Status::GRPC_STATUS, (Code::Unimplemented as i32).into());
    headers.insert(
        http::header::CONTENT_TYPE,
        tonic::metadata::GRPC_CONTENT_TYPE,
    );
    response
}

/// Decode, run the handler through the pipeline, encode
async fn unary<Req, Resp, H, Fut>(
    state: AppState,
    rpc: Rpc,
    req: http::Request<Body>,
    handler: H,
) -> Result<http::Response<tonic::body::Body>, Infallible>
where
    Req: prost::Message + Default + Send + 'static,
    Resp: prost::Message + Send + 'static,
    H: Fn(AppState, RequestContext, Req) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<Resp, Status>> + Send + 'static,
{
    let method = Unary {
        state,
        rpc,
        handler,
        _marker: PhantomData,
    };
    let mut grpc = Grpc::new(ProstCodec::<Resp, Req>::default());
    Ok(grpc.unary(method, req).await)
}

struct Unary<Req, Resp, H> {
    state: AppState,
    rpc: Rpc,
    handler: H,
    _marker: PhantomData<fn(Req) -> Resp>,
}

impl<Req, Resp, H, Fut> UnaryService<Req> for Unary<Req, Resp, H>
where
    Req: Send + 'static,
    Resp: Send + 'static,
    H: Fn(AppState, RequestContext, Req) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<Resp, Status>> + Send + 'static,
{
    type Response = Resp;
    type Future = BoxFuture<tonic::Response<Resp>, Status>;

    fn call(&mut self, request: tonic::Request<Req>) -> Self::Future {
        let state = self.state.clone();
        let rpc = self.rpc;
        let handler = self.handler.clone();
        Box::pin(pipeline(state, rpc, request, handler))
    }
}

async fn pipeline<Req, Resp, H, Fut>(
    state: AppState,
    rpc: Rpc,
    request: tonic::Request<Req>,
    handler: H,
) -> Result<tonic::Response<Resp>, Status>
where
    H: Fn(AppState, RequestContext, Req) -> Fut,
    Fut: Future<Output = Result<Resp, Status>>,
{
    // auth
    let caller = caller_from_metadata(request.metadata());
    if caller.is_none() && !rpc.is_public() {
        warn!(method = rpc.name(), "Rejected call without caller identity");
        return Err(to_status(&ServiceError::from(DomainError::Unauthenticated)));
    }

    // logging
    let span = info_span!(
        "grpc_request",
        method = rpc.name(),
        caller = %caller.as_ref().map_or("-", UserId::as_str),
    );

    async move {
        // metrics
        let start = Instant::now();

        // tx
        let ctx = state
            .service_context()
            .request_context(caller)
            .with_span(Span::current());
        let call = handler(state.clone(), ctx, request.into_inner());
        let result = match AssertUnwindSafe(call).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => {
                error!(panic = panic_message(payload.as_ref()), "Handler panicked");
                Err(Status::internal("internal server error"))
            }
        };

        let elapsed = start.elapsed();
        state
            .metrics()
            .observe_request(&rpc.metric_name(), elapsed, result.is_err());

        let latency_ms = elapsed.as_millis();
        match &result {
            Ok(_) => info!(latency_ms, "Call completed"),
            Err(status) if status.code() == Code::Internal => {
                error!(code = ?status.code(), latency_ms, "Call failed");
            }
            Err(status) => warn!(code = ?status.code(), latency_ms, "Call rejected"),
        }

        result.map(tonic::Response::new)
    }
    .instrument(span)
    .await
}

fn service_status(err: ServiceError) -> Status {
    to_status(&err)
}

async fn save_draft_material(
    state: AppState,
    ctx: RequestContext,
    input: proto::SaveDraftMaterialIn,
) -> Result<proto::SaveDraftMaterialOut, Status> {
    let response = MaterialService::new(state.service_context())
        .save_draft(&ctx, input.into())
        .await
        .map_err(service_status)?;
    Ok(proto::SaveDraftMaterialOut {
        uuid: response.uuid,
    })
}

async fn publish_material(
    state: AppState,
    ctx: RequestContext,
    input: proto::PublishMaterialIn,
) -> Result<proto::PublishMaterialOut, Status> {
    let response = MaterialService::new(state.service_context())
        .publish_material(&ctx, input.into())
        .await
        .map_err(service_status)?;
    Ok(proto::PublishMaterialOut {
        material: Some(response.material.into()),
    })
}

async fn edit_material(
    state: AppState,
    ctx: RequestContext,
    input: proto::EditMaterialIn,
) -> Result<proto::EditMaterialOut, Status> {
    let response = MaterialService::new(state.service_context())
        .edit_material(&ctx, input.into())
        .await
        .map_err(service_status)?;
    Ok(proto::EditMaterialOut {
        material: Some(response.material.into()),
    })
}

async fn toggle_like(
    state: AppState,
    ctx: RequestContext,
    input: proto::ToggleLikeIn,
) -> Result<proto::ToggleLikeOut, Status> {
    let response = MaterialService::new(state.service_context())
        .toggle_like(&ctx, input.into())
        .await
        .map_err(service_status)?;
    Ok(response.into())
}

async fn archived_material(
    state: AppState,
    ctx: RequestContext,
    input: proto::ArchivedMaterialIn,
) -> Result<proto::ArchivedMaterialOut, Status> {
    MaterialService::new(state.service_context())
        .archive_material(&ctx, input.into())
        .await
        .map_err(service_status)?;
    Ok(proto::ArchivedMaterialOut {})
}

async fn delete_material(
    state: AppState,
    ctx: RequestContext,
    input: proto::DeleteMaterialIn,
) -> Result<proto::DeleteMaterialOut, Status> {
    MaterialService::new(state.service_context())
        .delete_material(&ctx, input.into())
        .await
        .map_err(service_status)?;
    Ok(proto::DeleteMaterialOut {})
}

async fn get_all_materials(
    state: AppState,
    ctx: RequestContext,
    input: proto::GetAllMaterialsIn,
) -> Result<proto::GetAllMaterialsOut, Status> {
    let response = MaterialService::new(state.service_context())
        .get_all_materials(&ctx, input.into())
        .await
        .map_err(service_status)?;
    Ok(proto::GetAllMaterialsOut {
        material_list: response
            .material_list
            .into_iter()
            .map(proto::Material::from)
            .collect(),
    })
}

async fn get_material(
    state: AppState,
    ctx: RequestContext,
    input: proto::GetMaterialIn,
) -> Result<proto::GetMaterialOut, Status> {
    let response = MaterialService::new(state.service_context())
        .get_material(&ctx, input.into())
        .await
        .map_err(service_status)?;
    Ok(proto::GetMaterialOut {
        material: Some(response.material.into()),
    })
}
