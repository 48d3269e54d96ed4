//! Blob storage for contract file uploads.
//!
//! Allows swapping the local-directory store for an in-memory one without
//! touching the upload and download handlers.

use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
    sync::RwLock,
};

use async_trait::async_trait;
use axum::body::Bytes;
use itam_core::RecordId;
use uuid::Uuid;

/// Errors raised by a [`FileStore`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StorageError {
    /// No blob is stored under the key.
    #[error("blob not found: {0}")]
    Missing(String),

    /// Underlying I/O error.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The in-memory blob map lock was poisoned.
    #[error("blob store lock poisoned")]
    Poisoned,
}

/// Storage backend for uploaded contract files.
///
/// Implementations must be `Send + Sync` to be shared by all handlers.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store `bytes` for `contract_id` and return the storage key.
    ///
    /// # Errors
    /// Returns [`StorageError::Io`] if the blob cannot be written.
    async fn put(
        &self,
        contract_id: RecordId,
        file_name: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError>;

    /// Read back the blob stored under `key`.
    ///
    /// # Errors
    /// Returns [`StorageError::Missing`] if nothing is stored under `key`.
    async fn get(&self, key: &str) -> Result<Bytes, StorageError>;
}

/// Build a unique storage key: `{contract_id}_{uuid}_{base name}`.
///
/// Only the last path component of the client-supplied name is kept.
#[must_use]
pub fn blob_key(contract_id: RecordId, file_name: &str) -> String {
    format!("{contract_id}_{}_{}", Uuid::new_v4().simple(), base_name(file_name))
}

fn base_name(file_name: &str) -> &str {
    let name = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
    match name {
        "" | "." | ".." => "upload.bin",
        other => other,
    }
}

/// Stores blobs as files under a root directory.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Create a store rooted at `root`. The directory is created on first
    /// upload.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory blobs are written to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        if base_name(key) != key {
            return Err(StorageError::Missing(key.to_owned()));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn put(
        &self,
        contract_id: RecordId,
        file_name: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let key = blob_key(contract_id, file_name);
        let path = self.resolve(&key)?;
        tokio::fs::write(&path, &bytes).await?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "blob written");
        Ok(key)
    }

    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::Missing(key.to_owned()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps blobs in process memory.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    blobs: RwLock<HashMap<String, Bytes>>,
}

impl MemoryFileStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn put(
        &self,
        contract_id: RecordId,
        file_name: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError> {
        let key = blob_key(contract_id, file_name);
        self.blobs
            .write()
            .map_err(|_| StorageError::Poisoned)?
            .insert(key.clone(), bytes);
        Ok(key)
    }

    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        self.blobs
            .read()
            .map_err(|_| StorageError::Poisoned)?
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::Missing(key.to_owned()))
    }
}
