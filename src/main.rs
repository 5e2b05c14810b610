//! Watermark gateway function.
//!
//! # Architecture Overview
//!
//! ```text
//!   runtime API ──event──▶ ┌──────────────────────────────────────────────┐
//!                          │ runtime ─▶ adapter::ProxyFunction            │
//!                          │              │ request marshaller            │
//!                          │              ▼                               │
//!                          │            ServicePipeline ─▶ app router     │
//!                          │              │                 │   │         │
//!                          │              │              storage render   │
//!                          │              ▼ response marshaller           │
//!   runtime API ◀─response─│            encoding policy                   │
//!                          └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use watermark_gateway::adapter::{ProxyFunction, ServicePipeline};
use watermark_gateway::app::{build_router, AppState};
use watermark_gateway::config::{load_config, GatewayConfig, StorageBackend};
use watermark_gateway::observability::logging;
use watermark_gateway::render::PdfStamp;
use watermark_gateway::runtime::{self, client::FunctionMetadata, RuntimeClient, RuntimeError};
use watermark_gateway::storage::{FsStore, MemoryStore, ObjectStore};

#[derive(Parser)]
#[command(name = "watermark-gateway")]
#[command(about = "Serverless document watermarking behind an API Gateway proxy", long_about = None)]
struct Cli {
    /// Path to a TOML config file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init(&config.observability)?;
    tracing::info!("watermark-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        storage = ?config.storage.backend,
        default_encoding = config.adapter.default_encoding.as_str(),
        request_logging = config.adapter.enable_request_logging,
        response_logging = config.adapter.enable_response_logging,
        "Configuration loaded"
    );

    let store: Arc<dyn ObjectStore> = match config.storage.backend {
        StorageBackend::Filesystem => Arc::new(FsStore::new(&config.storage.root)),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };
    let state = AppState::new(store, Arc::new(PdfStamp), config.watermark.clone());

    let function = ProxyFunction::builder(ServicePipeline::new(build_router(state)))
        .with_config(&config.adapter)
        .build();

    let endpoint = config
        .runtime
        .resolve_endpoint()
        .ok_or(RuntimeError::NoEndpoint)?;
    let client = RuntimeClient::new(&endpoint, FunctionMetadata::from_env());

    runtime::run(client, function).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
