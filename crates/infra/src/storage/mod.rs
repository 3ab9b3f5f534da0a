//! Object storage for uploaded company logos.

mod local;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thiserror::Error;

pub use local::LocalFileStorage;

/// File storage failure. Messages are surfaced to users verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Underlying I/O or transport failure.
    #[error("{0}")]
    Io(String),

    /// The storage refused the object (bad key, duplicate, quota).
    #[error("{0}")]
    Rejected(String),

    #[error("unknown storage failure")]
    Unknown,
}

/// Where an uploaded object ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bucket: String,
    /// Object key within the bucket; this is what gets recorded as the logo path.
    pub path: String,
}

/// Upload-only object storage, addressed by bucket and key.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store `bytes` under `bucket/key`. Existing objects are never overwritten.
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<StoredObject, StorageError>;
}

#[async_trait]
impl<S> FileStorage for Arc<S>
where
    S: FileStorage + ?Sized,
{
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<StoredObject, StorageError> {
        (**self).upload(bucket, key, bytes, content_type).await
    }
}

/// Reject keys that are empty, absolute or climb out of the bucket.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.trim().is_empty() {
        return Err(StorageError::Rejected("object key cannot be empty".to_string()));
    }
    if key.starts_with('/') || key.starts_with('\\') {
        return Err(StorageError::Rejected(format!("absolute object key not allowed: {key}")));
    }
    if key.split(['/', '\\']).any(|seg| seg == "..") {
        return Err(StorageError::Rejected(format!("object key escapes bucket: {key}")));
    }
    Ok(())
}

/// In-memory object storage for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryFileStorage {
    objects: RwLock<HashMap<(String, String), Vec<u8>>>,
    failure: RwLock<Option<StorageError>>,
}

impl InMemoryFileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent upload fail with `err` (`None` restores normal uploads).
    pub fn set_failure(&self, err: Option<StorageError>) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = err;
        }
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        let objects = self.objects.read().ok()?;
        objects.get(&(bucket.to_string(), key.to_string())).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl FileStorage for InMemoryFileStorage {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        _content_type: Option<&str>,
    ) -> Result<StoredObject, StorageError> {
        if let Some(err) = self
            .failure
            .read()
            .map_err(|_| StorageError::Io("lock poisoned".to_string()))?
            .clone()
        {
            return Err(err);
        }
        validate_key(key)?;

        let mut objects = self
            .objects
            .write()
            .map_err(|_| StorageError::Io("lock poisoned".to_string()))?;
        let slot = (bucket.to_string(), key.to_string());
        if objects.contains_key(&slot) {
            return Err(StorageError::Rejected(format!("object already exists: {bucket}/{key}")));
        }
        objects.insert(slot, bytes.to_vec());

        Ok(StoredObject {
            bucket: bucket.to_string(),
            path: key.to_string(),
        })
    }
}
