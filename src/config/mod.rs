//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → split into per-subsystem sections at startup
//! ```
//!
//! # Design Decisions
//! - Config is read once at cold start; there is no reload
//! - All fields have defaults so an empty file (or none) is valid
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdapterConfig, GatewayConfig, ObservabilityConfig, RuntimeConfig, StorageBackend,
    StorageConfig, WatermarkConfig,
};
