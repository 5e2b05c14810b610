//! Object storage collaborator.
//!
//! # Responsibilities
//! - Get, put and delete whole objects by key
//! - Classify failures as retryable or terminal
//!
//! # Design Decisions
//! - Callers never retry; classification is informational
//! - Keys are relative, `/`-separated, and may not escape the store root
//! - Failures are logged where they happen and propagated unchanged

pub mod fs;
pub mod memory;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use fs::FsStore;
pub use memory::MemoryStore;

/// Errors returned by object stores.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No object exists under the key.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The key cannot address an object.
    #[error("invalid object key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// The backend failed.
    #[error("storage failure for {key}: {source}")]
    Backend {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Whether repeating the call could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            StorageError::NotFound(_) | StorageError::InvalidKey { .. } => false,
            StorageError::Backend { source, .. } => matches!(
                source.kind(),
                std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::WouldBlock
            ),
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Whole-object store addressed by key.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()>;

    async fn delete(&self, key: &str) -> StorageResult<()>;
}

/// Reject keys that are empty, absolute, or climb out of the root.
pub fn validate_key(key: &str) -> StorageResult<()> {
    let invalid = |reason| {
        Err(StorageError::InvalidKey {
            key: key.to_string(),
            reason,
        })
    };
    if key.is_empty() {
        return invalid("empty key");
    }
    if key.starts_with('/') || key.starts_with('\\') {
        return invalid("absolute key");
    }
    if key.split(|c: char| c == '/' || c == '\\').any(|segment| segment == ".." || segment.is_empty()) {
        return invalid("empty or parent segment");
    }
    Ok(())
}
