//! API Gateway proxy adapter with a document watermarking application.

pub mod adapter;
pub mod app;
pub mod config;
pub mod observability;
pub mod render;
pub mod runtime;
pub mod storage;

pub use adapter::{ProxyFunction, ProxyFunctionBuilder, ServicePipeline};
pub use config::GatewayConfig;
pub use runtime::RuntimeClient;
