//! Invocation orchestration.
//!
//! # Responsibilities
//! - Deserialize the raw event and build the execution context
//! - Invoke the pipeline exactly once and wait for it to finish
//! - Marshal and serialize the single response for the invocation
//!
//! # Lifecycle
//! ```text
//! Received → Marshalled → Invoking → Completed → Serialized
//!                                  ↘ Faulted (error re-raised)
//! ```
//!
//! # Design Decisions
//! - Pipeline failures are logged with the path and returned as errors; no
//!   substitute HTTP response is synthesized
//! - Diagnostic logging reads borrowed bytes and never changes the output
//! - No retries and no timeouts; the platform owns both

use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use tracing::Instrument;

use crate::adapter::context::{ExecutionContext, InvocationContext};
use crate::adapter::encoding::{EncodingMode, EncodingPolicy};
use crate::adapter::error::{AdapterError, AdapterResult};
use crate::adapter::event::{ProxyRequest, ProxyResponse};
use crate::adapter::pipeline::Pipeline;
use crate::adapter::request::{DefaultRequestMarshaller, RequestMarshaller};
use crate::adapter::response::{DefaultResponseMarshaller, ResponseMarshaller};
use crate::config::AdapterConfig;
use crate::observability::metrics;

/// Stage an invocation has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationPhase {
    Received,
    Marshalled,
    Invoking,
    Completed,
    Faulted,
    Serialized,
}

/// Gateway-facing function wrapping an application pipeline.
pub struct ProxyFunction<P> {
    pipeline: P,
    policy: Arc<EncodingPolicy>,
    request_marshaller: Arc<dyn RequestMarshaller>,
    response_marshaller: Arc<dyn ResponseMarshaller>,
    enable_request_logging: bool,
    enable_response_logging: bool,
}

impl<P: Pipeline> ProxyFunction<P> {
    /// Start configuring a function around `pipeline`.
    pub fn builder(pipeline: P) -> ProxyFunctionBuilder<P> {
        ProxyFunctionBuilder::new(pipeline)
    }

    /// The frozen encoding policy.
    pub fn encoding_policy(&self) -> &EncodingPolicy {
        &self.policy
    }

    /// Handle one raw event and return the raw response event.
    pub async fn handle(
        &self,
        raw_event: &[u8],
        invocation: InvocationContext,
    ) -> AdapterResult<Vec<u8>> {
        let span = invocation.span();
        async move {
            let start = Instant::now();
            self.transition(InvocationPhase::Received);
            if self.enable_request_logging {
                tracing::info!(event = %String::from_utf8_lossy(raw_event), "Raw proxy request");
            }

            let result = match ProxyRequest::from_slice(raw_event) {
                Ok(request) => self.process(request, invocation).await,
                Err(err) => {
                    tracing::error!(error = %err, "Rejected proxy event");
                    Err(err)
                }
            };
            let result = result.and_then(|response| self.serialize(&response));

            metrics::record_invocation(outcome(&result), start);
            result
        }
        .instrument(span)
        .await
    }

    /// Handle an already-decoded event.
    pub async fn handle_request(
        &self,
        request: ProxyRequest,
        invocation: InvocationContext,
    ) -> AdapterResult<ProxyResponse> {
        let span = invocation.span();
        async move {
            let start = Instant::now();
            self.transition(InvocationPhase::Received);
            let result = match request.validate() {
                Ok(()) => self.process(request, invocation).await,
                Err(err) => {
                    tracing::error!(error = %err, "Rejected proxy event");
                    Err(err)
                }
            };

            metrics::record_invocation(outcome(&result), start);
            result
        }
        .instrument(span)
        .await
    }

    async fn process(
        &self,
        request: ProxyRequest,
        invocation: InvocationContext,
    ) -> AdapterResult<ProxyResponse> {
        tracing::info!(
            method = %request.http_method,
            path = %request.path,
            gateway_request_id = %request.request_id(),
            "Incoming {} request to {}",
            request.http_method,
            request.path
        );

        let generic = match self.request_marshaller.marshal(&request) {
            Ok(generic) => generic,
            Err(err) => {
                tracing::error!(error = %err, "Rejected proxy event");
                return Err(err);
            }
        };
        let path = request.path.clone();
        let mut ctx = ExecutionContext::bind(generic, Arc::new(request), Arc::new(invocation));
        self.transition(InvocationPhase::Marshalled);

        self.transition(InvocationPhase::Invoking);
        if let Err(source) = self.pipeline.invoke(&mut ctx).await {
            self.transition(InvocationPhase::Faulted);
            tracing::error!(path = %path, error = %source, details = ?source, "Exception handling {}", path);
            return Err(AdapterError::Pipeline { path, source });
        }
        self.transition(InvocationPhase::Completed);

        Ok(self
            .response_marshaller
            .marshal(ctx.into_response(), &self.policy, StatusCode::OK))
    }

    fn serialize(&self, response: &ProxyResponse) -> AdapterResult<Vec<u8>> {
        let bytes = response.to_vec()?;
        self.transition(InvocationPhase::Serialized);
        if self.enable_response_logging {
            tracing::info!(event = %String::from_utf8_lossy(&bytes), "Raw proxy response");
        }
        Ok(bytes)
    }

    fn transition(&self, phase: InvocationPhase) {
        tracing::trace!(?phase, "Invocation phase");
    }
}

fn outcome<T>(result: &AdapterResult<T>) -> &'static str {
    match result {
        Ok(_) => "completed",
        Err(AdapterError::Pipeline { .. }) => "faulted",
        Err(_) => "rejected",
    }
}

/// Setup-phase configuration for a `ProxyFunction`.
///
/// Encoding registrations are only possible here; `build` freezes them.
pub struct ProxyFunctionBuilder<P> {
    pipeline: P,
    policy: EncodingPolicy,
    request_marshaller: Arc<dyn RequestMarshaller>,
    response_marshaller: Arc<dyn ResponseMarshaller>,
    enable_request_logging: bool,
    enable_response_logging: bool,
}

impl<P: Pipeline> ProxyFunctionBuilder<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            policy: EncodingPolicy::default(),
            request_marshaller: Arc::new(DefaultRequestMarshaller),
            response_marshaller: Arc::new(DefaultResponseMarshaller),
            enable_request_logging: false,
            enable_response_logging: false,
        }
    }

    /// Apply the `[adapter]` configuration section.
    pub fn with_config(mut self, config: &AdapterConfig) -> Self {
        self.policy.set_default_mode(config.default_encoding);
        for (content_type, mode) in &config.content_encodings {
            self.policy.register(content_type.clone(), *mode);
        }
        self.enable_request_logging = config.enable_request_logging;
        self.enable_response_logging = config.enable_response_logging;
        self
    }

    /// Register a content type's response encoding.
    pub fn register_content_encoding(
        mut self,
        content_type: impl Into<String>,
        mode: EncodingMode,
    ) -> Self {
        self.policy.register(content_type, mode);
        self
    }

    pub fn default_encoding(mut self, mode: EncodingMode) -> Self {
        self.policy.set_default_mode(mode);
        self
    }

    /// Replace the whole encoding policy.
    pub fn encoding_policy(mut self, policy: EncodingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn request_marshaller(mut self, marshaller: impl RequestMarshaller + 'static) -> Self {
        self.request_marshaller = Arc::new(marshaller);
        self
    }

    pub fn response_marshaller(mut self, marshaller: impl ResponseMarshaller + 'static) -> Self {
        self.response_marshaller = Arc::new(marshaller);
        self
    }

    pub fn request_logging(mut self, enabled: bool) -> Self {
        self.enable_request_logging = enabled;
        self
    }

    pub fn response_logging(mut self, enabled: bool) -> Self {
        self.enable_response_logging = enabled;
        self
    }

    pub fn build(self) -> ProxyFunction<P> {
        ProxyFunction {
            pipeline: self.pipeline,
            policy: Arc::new(self.policy),
            request_marshaller: self.request_marshaller,
            response_marshaller: self.response_marshaller,
            enable_request_logging: self.enable_request_logging,
            enable_response_logging: self.enable_response_logging,
        }
    }
}
