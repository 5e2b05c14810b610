//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the function.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::adapter::EncodingMode;

/// Root configuration for the gateway function.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Event adapter settings.
    pub adapter: AdapterConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Object storage backend.
    pub storage: StorageConfig,

    /// Watermarking defaults.
    pub watermark: WatermarkConfig,

    /// Platform runtime API settings.
    pub runtime: RuntimeConfig,
}

/// Event adapter configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AdapterConfig {
    /// Log every raw inbound event. Debugging aid, not for production.
    pub enable_request_logging: bool,

    /// Log every raw outbound event. Debugging aid, not for production.
    pub enable_response_logging: bool,

    /// Encoding for content types with no registration.
    pub default_encoding: EncodingMode,

    /// Extra content-type registrations applied on top of the built-in table.
    pub content_encodings: BTreeMap<String, EncodingMode>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Which object store implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Filesystem,
    Memory,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Root directory for the filesystem backend.
    pub root: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Filesystem,
            root: "./data".to_string(),
        }
    }
}

/// Watermark configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatermarkConfig {
    /// Label used when a request does not supply one.
    pub default_label: String,

    /// Key prefix under which watermarked copies are stored.
    pub output_prefix: String,

    /// Public URL prefix reported for stored copies.
    pub public_base_url: String,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            default_label: "CONFIDENTIAL".to_string(),
            output_prefix: "temp".to_string(),
            public_base_url: "http://localhost".to_string(),
        }
    }
}

/// Runtime API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RuntimeConfig {
    /// `host:port` of the runtime API; falls back to `AWS_LAMBDA_RUNTIME_API`.
    pub api_endpoint: Option<String>,
}

impl RuntimeConfig {
    /// Endpoint from config or environment.
    pub fn resolve_endpoint(&self) -> Option<String> {
        self.api_endpoint
            .clone()
            .or_else(|| std::env::var("AWS_LAMBDA_RUNTIME_API").ok())
    }
}
