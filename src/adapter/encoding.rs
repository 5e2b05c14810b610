//! Response content encoding policy.
//!
//! # Responsibilities
//! - Map a MIME content type to the transport encoding of the response body
//! - Supply the fallback mode for unregistered or missing content types
//!
//! # Design Decisions
//! - Parameters after the first `;` are ignored (`text/plain; charset=utf-8`)
//! - Lookup is case-sensitive on the stripped type
//! - Binary-safe is the fallback for unregistered types
//! - The policy is a plain value; `ProxyFunction` freezes it behind an `Arc`

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// How a response body travels back to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EncodingMode {
    /// Body is sent as UTF-8 text.
    Direct,
    /// Body is sent as standard Base64 and flagged as such.
    #[default]
    BinarySafe,
}

impl EncodingMode {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodingMode::Direct => "direct",
            EncodingMode::BinarySafe => "binary_safe",
        }
    }
}

const DIRECT_TYPES: &[&str] = &[
    "text/plain",
    "text/xml",
    "application/xml",
    "application/json",
    "text/html",
    "text/css",
    "text/javascript",
    "text/ecmascript",
    "text/markdown",
    "text/csv",
];

const BINARY_SAFE_TYPES: &[&str] = &[
    "application/octet-stream",
    "image/png",
    "image/gif",
    "image/jpeg",
    "application/zip",
    "application/pdf",
];

/// Content-type to encoding table with a fallback mode.
#[derive(Debug, Clone)]
pub struct EncodingPolicy {
    table: HashMap<String, EncodingMode>,
    default_mode: EncodingMode,
}

impl EncodingPolicy {
    /// Create a policy with no registrations.
    pub fn empty(default_mode: EncodingMode) -> Self {
        Self {
            table: HashMap::new(),
            default_mode,
        }
    }

    /// Register (or overwrite) the mode for a content type.
    ///
    /// The content type is stored as given; no format validation is done.
    pub fn register(&mut self, content_type: impl Into<String>, mode: EncodingMode) {
        self.table.insert(content_type.into(), mode);
    }

    /// Change the fallback mode.
    pub fn set_default_mode(&mut self, mode: EncodingMode) {
        self.default_mode = mode;
    }

    pub fn default_mode(&self) -> EncodingMode {
        self.default_mode
    }

    /// Resolve the encoding for a response content type.
    pub fn resolve(&self, content_type: Option<&str>) -> EncodingMode {
        let Some(content_type) = content_type else {
            return self.default_mode;
        };
        let media_type = content_type.split(';').next().unwrap_or(content_type);
        self.table
            .get(media_type)
            .copied()
            .unwrap_or(self.default_mode)
    }

    /// Number of registered content types.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for EncodingPolicy {
    fn default() -> Self {
        let mut policy = Self::empty(EncodingMode::BinarySafe);
        for content_type in DIRECT_TYPES {
            policy.register(*content_type, EncodingMode::Direct);
        }
        for content_type in BINARY_SAFE_TYPES {
            policy.register(*content_type, EncodingMode::BinarySafe);
        }
        policy
    }
}
