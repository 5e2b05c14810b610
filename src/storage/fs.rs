//! Filesystem-backed object store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::observability::metrics;
use crate::storage::{validate_key, ObjectStore, StorageError, StorageResult};

/// Stores each object as a file under a root directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

fn map_io(key: &str, operation: &'static str, err: std::io::Error) -> StorageError {
    if err.kind() == ErrorKind::NotFound {
        return StorageError::NotFound(key.to_string());
    }
    tracing::error!(key = %key, operation, error = %err, "Storage operation failed");
    StorageError::Backend {
        key: key.to_string(),
        source: err,
    }
}

#[async_trait]
impl ObjectStore for FsStore {
    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let path = self.path_for(key)?;
        let result = tokio::fs::read(&path)
            .await
            .map(Bytes::from)
            .map_err(|e| map_io(key, "get", e));
        metrics::record_storage("get", result.is_ok());
        result
    }

    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| map_io(key, "put", e))?;
        }
        let result = tokio::fs::write(&path, &data)
            .await
            .map_err(|e| map_io(key, "put", e));
        metrics::record_storage("put", result.is_ok());
        if result.is_ok() {
            tracing::debug!(key = %key, bytes = data.len(), "Stored object");
        }
        result
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        let result = tokio::fs::remove_file(&path)
            .await
            .map_err(|e| map_io(key, "delete", e));
        metrics::record_storage("delete", result.is_ok());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fs-store-{}-{}", name, uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_round_trip_with_nested_key() {
        let dir = scratch_dir("nested");
        let store = FsStore::new(&dir);

        store
            .put("temp/out/a.pdf", Bytes::from_static(b"bytes"))
            .await
            .unwrap();
        assert!(dir.join("temp/out/a.pdf").exists());
        assert_eq!(
            store.get("temp/out/a.pdf").await.unwrap(),
            Bytes::from_static(b"bytes")
        );

        store.delete("temp/out/a.pdf").await.unwrap();
        assert!(matches!(
            store.get("temp/out/a.pdf").await,
            Err(StorageError::NotFound(_))
        ));

        std::fs::remove_dir_all(&dir).unwrap_or_default();
    }

    #[tokio::test]
    async fn test_traversal_is_rejected() {
        let dir = scratch_dir("traversal");
        let store = FsStore::new(&dir);
        let err = store.get("../secret").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey { .. }));
        std::fs::remove_dir_all(&dir).unwrap_or_default();
    }
}
