//! Downstream application pipeline seam.
//!
//! A pipeline is invoked exactly once per invocation and writes its result
//! onto `ctx.response`. `ServicePipeline` lets any tower service (an
//! `axum::Router` in practice) act as the pipeline.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, Uri};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tower::{Service, ServiceExt};

use crate::adapter::context::ExecutionContext;
use crate::adapter::error::BoxError;

/// Characters escaped when a gateway path is turned into a URI path.
///
/// The gateway path is already decoded, so `%` is escaped too.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// The application invoked for every request.
#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Process the request and write the response onto the context.
    async fn invoke(&self, ctx: &mut ExecutionContext) -> Result<(), BoxError>;
}

#[async_trait]
impl<P: Pipeline + ?Sized> Pipeline for Arc<P> {
    async fn invoke(&self, ctx: &mut ExecutionContext) -> Result<(), BoxError> {
        (**self).invoke(ctx).await
    }
}

/// Adapts a tower service to the `Pipeline` seam.
#[derive(Debug, Clone)]
pub struct ServicePipeline<S> {
    service: S,
}

impl<S> ServicePipeline<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<S> Pipeline for ServicePipeline<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + Sync + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
{
    async fn invoke(&self, ctx: &mut ExecutionContext) -> Result<(), BoxError> {
        let request = to_http_request(ctx)?;
        let response = self
            .service
            .clone()
            .oneshot(request)
            .await
            .map_err(Into::into)?;

        let (parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX).await?;

        ctx.response.set_status(parts.status);
        *ctx.response.headers_mut() = parts.headers;
        ctx.response.append(&bytes);
        Ok(())
    }
}

/// Build an `http::Request` from the generic request, carrying the bound
/// event and invocation metadata as extensions.
pub fn to_http_request(ctx: &ExecutionContext) -> Result<Request<Body>, BoxError> {
    let generic = &ctx.request;
    let mut target = utf8_percent_encode(&generic.path, PATH_SEGMENT).to_string();
    if !generic.query_string.is_empty() {
        target.push('?');
        target.push_str(&generic.query_string);
    }
    let uri = Uri::from_str(&target)?;

    let mut request = Request::builder()
        .method(generic.method.clone())
        .uri(uri)
        .body(Body::from(generic.body.clone()))?;
    *request.headers_mut() = generic.headers.clone();

    if let Some(proxy_request) = ctx.shared_proxy_request() {
        request.extensions_mut().insert(proxy_request);
    }
    if let Some(invocation) = ctx.shared_invocation() {
        request.extensions_mut().insert(invocation);
    }
    Ok(request)
}
