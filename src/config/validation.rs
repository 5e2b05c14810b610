//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and formats (log level, key prefixes, labels)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::{GatewayConfig, StorageBackend};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration, collecting every problem.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let level = config.observability.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level {:?}", config.observability.log_level),
        ));
    }

    if config.storage.backend == StorageBackend::Filesystem && config.storage.root.trim().is_empty() {
        errors.push(ValidationError::new(
            "storage.root",
            "filesystem backend needs a root directory",
        ));
    }

    let label = &config.watermark.default_label;
    if label.trim().is_empty() {
        errors.push(ValidationError::new("watermark.default_label", "must not be empty"));
    } else if label.contains(|c: char| c == '\r' || c == '\n') {
        errors.push(ValidationError::new("watermark.default_label", "must be a single line"));
    }

    let prefix = &config.watermark.output_prefix;
    if prefix.is_empty() {
        errors.push(ValidationError::new("watermark.output_prefix", "must not be empty"));
    } else if prefix.starts_with('/') {
        errors.push(ValidationError::new(
            "watermark.output_prefix",
            "must be relative (no leading '/')",
        ));
    }

    for content_type in config.adapter.content_encodings.keys() {
        if content_type.trim().is_empty() {
            errors.push(ValidationError::new(
                "adapter.content_encodings",
                "content type keys must not be empty",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
