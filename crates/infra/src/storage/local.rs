use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::instrument;

use super::{validate_key, FileStorage, StorageError, StoredObject};

/// Filesystem-backed object storage: `<root>/<bucket>/<key>`.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(bucket)?;
        validate_key(key)?;
        Ok(self.root.join(bucket).join(key))
    }
}

fn io_error(context: &str, err: std::io::Error) -> StorageError {
    match err.kind() {
        ErrorKind::AlreadyExists => StorageError::Rejected(format!("{context}: object already exists")),
        _ => StorageError::Io(format!("{context}: {err}")),
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    #[instrument(skip(self, bytes, content_type), fields(size = bytes.len()), err)]
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<StoredObject, StorageError> {
        let path = self.object_path(bucket, key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("failed to create bucket directory", e))?;
        }

        let mut file = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&path)
            .await
            .map_err(|e| io_error(key, e))?;
        file.write_all(bytes).await.map_err(|e| io_error(key, e))?;
        file.sync_all().await.map_err(|e| io_error(key, e))?;

        tracing::debug!(path = %path.display(), "stored object");
        Ok(StoredObject {
            bucket: bucket.to_string(),
            path: key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_object_under_bucket_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(tmp.path());

        let stored = storage
            .upload("company-logos", "1700000000000.png", b"\x89PNG", Some("image/png"))
            .await
            .unwrap();

        assert_eq!(stored.path, "1700000000000.png");
        let on_disk = std::fs::read(tmp.path().join("company-logos/1700000000000.png")).unwrap();
        assert_eq!(on_disk, b"\x89PNG");
    }

    #[tokio::test]
    async fn existing_object_is_not_overwritten() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(tmp.path());

        storage.upload("b", "logo", b"first", None).await.unwrap();
        let err = storage.upload("b", "logo", b"second", None).await.unwrap_err();

        assert!(matches!(err, StorageError::Rejected(_)));
        assert_eq!(std::fs::read(tmp.path().join("b/logo")).unwrap(), b"first");
    }

    #[tokio::test]
    async fn escaping_keys_never_touch_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(tmp.path().join("root"));

        assert!(storage.upload("b", "../escape.png", b"x", None).await.is_err());
        assert!(!tmp.path().join("root/escape.png").exists());
        assert!(!tmp.path().join("escape.png").exists());
    }
}
