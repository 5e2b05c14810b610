//! In-memory object store.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use crate::observability::metrics;
use crate::storage::{validate_key, ObjectStore, StorageError, StorageResult};

/// A thread-safe store kept in process memory.
///
/// Clones share the same objects.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Keys currently stored, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.iter().map(|r| r.key().clone()).collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        validate_key(key)?;
        let result = self
            .inner
            .get(key)
            .map(|r| r.value().clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()));
        metrics::record_storage("get", result.is_ok());
        result
    }

    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        validate_key(key)?;
        self.inner.insert(key.to_string(), data);
        metrics::record_storage("put", true);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        let removed = self.inner.remove(key).is_some();
        metrics::record_storage("delete", removed);
        if removed {
            Ok(())
        } else {
            Err(StorageError::NotFound(key.to_string()))
        }
    }
}
