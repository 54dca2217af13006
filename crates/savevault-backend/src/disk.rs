//! Local-disk backend.

use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;
use savevault_errors::StorageError;
use tokio::fs as async_fs;
use tracing::debug;

use crate::FileOperations;

/// Backend writing directly to the local file system.
///
/// Synchronous operations use `std::fs` (the shutdown drain relies on them
/// completing without a runtime); asynchronous operations use `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFileOperations;

impl DiskFileOperations {
    /// Create a new disk backend.
    pub fn new() -> Self {
        Self
    }
}

fn map_missing(result: std::io::Result<Vec<u8>>) -> std::io::Result<Option<Vec<u8>>> {
    match result {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

#[async_trait]
impl FileOperations for DiskFileOperations {
    fn initialize(&self) -> Result<(), StorageError> {
        Ok(())
    }

    fn save(&self) -> Result<(), StorageError> {
        // Plain disks have no platform commit step.
        Ok(())
    }

    fn create_directory(&self, path: &Path) -> Result<(), StorageError> {
        std::fs::create_dir_all(path)
            .map_err(|err| StorageError::directory_creation_failed(path, err))
    }

    fn delete_directory(&self, path: &Path) -> Result<(), StorageError> {
        match std::fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::delete_failed(path, err)),
        }
    }

    fn delete_file(&self, path: &Path) -> Result<(), StorageError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::delete_failed(path, err)),
        }
    }

    fn write_all_bytes(&self, path: &Path, content: &[u8]) -> Result<(), StorageError> {
        debug!(path = ?path, bytes = content.len(), "writing file");
        std::fs::write(path, content).map_err(|err| StorageError::write_failed(path, err))
    }

    async fn write_all_bytes_async(
        &self,
        path: &Path,
        content: &[u8],
    ) -> Result<(), StorageError> {
        debug!(path = ?path, bytes = content.len(), "writing file async");
        async_fs::write(path, content)
            .await
            .map_err(|err| StorageError::write_failed(path, err))
    }

    fn read_all_bytes(&self, path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
        debug!(path = ?path, "reading file");
        map_missing(std::fs::read(path)).map_err(|err| StorageError::read_failed(path, err))
    }

    async fn read_all_bytes_async(&self, path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
        debug!(path = ?path, "reading file async");
        map_missing(async_fs::read(path).await)
            .map_err(|err| StorageError::read_failed(path, err))
    }
}
