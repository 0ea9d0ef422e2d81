//! File storage backends for uploaded applicant documents.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{StorageBackendKind, StorageConfig};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("cloud storage backend is not implemented yet")]
    Unsupported,
}

/// Saves and deletes files addressed by a logical destination path.
pub trait StorageBackend: Send + Sync {
    /// Persist the bytes and return the resulting logical path.
    fn save(&self, bytes: &[u8], destination: &str, content_type: &str)
        -> Result<String, StorageError>;
    fn delete(&self, destination: &str) -> Result<(), StorageError>;
}

/// Filesystem-backed storage used in development and on-premise deploys.
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl StorageBackend for LocalStorage {
    fn save(
        &self,
        bytes: &[u8],
        destination: &str,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        let target = self.base_path.join(destination);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, bytes)?;
        Ok(target.to_string_lossy().into_owned())
    }

    fn delete(&self, destination: &str) -> Result<(), StorageError> {
        let path = Path::new(destination);
        let target = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(destination)
        };
        match fs::remove_file(&target) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Cloud storage slot reserved for the hosted deployment. Every operation
/// reports `Unsupported` until the backend lands.
pub struct CloudStorage {
    #[allow(dead_code)]
    bucket: Option<String>,
}

impl CloudStorage {
    pub fn new(bucket: Option<String>) -> Self {
        Self { bucket }
    }
}

impl StorageBackend for CloudStorage {
    fn save(
        &self,
        _bytes: &[u8],
        _destination: &str,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        Err(StorageError::Unsupported)
    }

    fn delete(&self, _destination: &str) -> Result<(), StorageError> {
        Err(StorageError::Unsupported)
    }
}

/// Pick the backend configured for this deployment.
pub fn storage_from_config(config: &StorageConfig) -> Box<dyn StorageBackend> {
    match config.backend {
        StorageBackendKind::Local => Box::new(LocalStorage::new(config.base_path.clone())),
        StorageBackendKind::Cloud => Box::new(CloudStorage::new(config.bucket.clone())),
    }
}
