//! Gateway event adapter subsystem.
//!
//! # Data Flow
//! ```text
//! raw event bytes
//!     → event.rs (deserialize ProxyRequest, structural checks)
//!     → request.rs (RequestMarshaller builds GenericRequest)
//!     → context.rs (ExecutionContext binds event + invocation metadata)
//!     → pipeline.rs (downstream application writes GenericResponse)
//!     → response.rs (ResponseMarshaller consults encoding.rs)
//!     → raw event-response bytes
//! ```
//!
//! `function.rs` owns the whole exchange for one invocation.
//!
//! # Design Decisions
//! - One ExecutionContext per invocation; nothing request-scoped is shared
//! - The encoding policy is frozen before the first invocation
//! - Pipeline failures are re-raised, never turned into a 500 response
//! - Marshallers are strategies so embedders can override a single step

pub mod context;
pub mod encoding;
pub mod error;
pub mod event;
pub mod function;
pub mod pipeline;
pub mod request;
pub mod response;

pub use context::{ExecutionContext, InvocationContext, RequestExt};
pub use encoding::{EncodingMode, EncodingPolicy};
pub use error::{AdapterError, BoxError};
pub use event::{ProxyRequest, ProxyResponse, RequestContext};
pub use function::{ProxyFunction, ProxyFunctionBuilder};
pub use pipeline::{Pipeline, ServicePipeline};
pub use request::{DefaultRequestMarshaller, GenericRequest, RequestMarshaller};
pub use response::{DefaultResponseMarshaller, GenericResponse, ResponseMarshaller};
