//! Per-invocation execution context and read-only accessors.
//!
//! # Responsibilities
//! - Bind the generic request/response pair for one invocation
//! - Expose the original event and platform metadata to pipeline code
//!
//! # Design Decisions
//! - Accessors return `None` when nothing was bound (e.g. unit tests that
//!   build a context by hand); absence is never an error
//! - Bound values are `Arc`s so they can also ride in `http::Extensions`

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use axum::http::Request;

use crate::adapter::event::ProxyRequest;
use crate::adapter::request::GenericRequest;
use crate::adapter::response::GenericResponse;

/// Platform metadata for a single invocation.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    /// Platform request identifier.
    pub request_id: String,
    /// Wall-clock time by which the invocation must finish.
    pub deadline: Option<SystemTime>,
    pub invoked_function_arn: Option<String>,
    pub trace_id: Option<String>,
    pub function_name: Option<String>,
    pub function_version: Option<String>,
    pub memory_limit_mb: Option<u32>,
}

impl InvocationContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            ..Default::default()
        }
    }

    pub fn with_deadline(mut self, deadline: SystemTime) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Time left before the deadline; zero once it has passed.
    pub fn remaining_time(&self) -> Option<Duration> {
        self.deadline.map(|deadline| {
            deadline
                .duration_since(SystemTime::now())
                .unwrap_or_default()
        })
    }

    /// Logger sink scoped to this invocation.
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "invocation",
            request_id = %self.request_id,
            function = self.function_name.as_deref().unwrap_or("unknown"),
        )
    }
}

/// Everything the pipeline sees for one invocation.
#[derive(Debug)]
pub struct ExecutionContext {
    pub request: GenericRequest,
    pub response: GenericResponse,
    proxy_request: Option<Arc<ProxyRequest>>,
    invocation: Option<Arc<InvocationContext>>,
}

impl ExecutionContext {
    /// Context with a fresh, writable response and nothing bound.
    pub fn new(request: GenericRequest) -> Self {
        Self {
            request,
            response: GenericResponse::new(),
            proxy_request: None,
            invocation: None,
        }
    }

    /// Context bound to the inbound event and invocation metadata.
    pub fn bind(
        request: GenericRequest,
        proxy_request: Arc<ProxyRequest>,
        invocation: Arc<InvocationContext>,
    ) -> Self {
        Self {
            proxy_request: Some(proxy_request),
            invocation: Some(invocation),
            ..Self::new(request)
        }
    }

    /// The original gateway event, if bound.
    pub fn proxy_request(&self) -> Option<&ProxyRequest> {
        self.proxy_request.as_deref()
    }

    /// Platform invocation metadata, if bound.
    pub fn invocation(&self) -> Option<&InvocationContext> {
        self.invocation.as_deref()
    }

    /// Gateway request id, when an event is bound.
    pub fn request_id(&self) -> Option<&str> {
        self.proxy_request().map(ProxyRequest::request_id)
    }

    pub(crate) fn shared_proxy_request(&self) -> Option<Arc<ProxyRequest>> {
        self.proxy_request.clone()
    }

    pub(crate) fn shared_invocation(&self) -> Option<Arc<InvocationContext>> {
        self.invocation.clone()
    }

    /// Hand the response to the marshaller.
    pub fn into_response(self) -> GenericResponse {
        self.response
    }
}

/// Accessors for handlers running behind a `ServicePipeline`.
pub trait RequestExt {
    /// The original gateway event, if this request came through the adapter.
    fn proxy_request(&self) -> Option<&ProxyRequest>;

    /// Platform invocation metadata, if available.
    fn invocation_context(&self) -> Option<&InvocationContext>;
}

impl<B> RequestExt for Request<B> {
    fn proxy_request(&self) -> Option<&ProxyRequest> {
        self.extensions()
            .get::<Arc<ProxyRequest>>()
            .map(|request| request.as_ref())
    }

    fn invocation_context(&self) -> Option<&InvocationContext> {
        self.extensions()
            .get::<Arc<InvocationContext>>()
            .map(|context| context.as_ref())
    }
}
