//! Byte-level storage backends for SaveVault
//!
//! The storage engine talks to the host environment exclusively through the
//! [`FileOperations`] capability: synchronous and asynchronous byte-level
//! reads and writes plus directory management and a backend-level `save`
//! commit (platform persistence flush). The capability is injected at
//! engine construction, so sandboxed or platform-specific backends slot in
//! without touching the engine.
//!
//! Two implementations ship with the crate:
//!
//! - [`DiskFileOperations`]: the local-disk backend (std::fs synchronous
//!   paths, tokio::fs asynchronous paths)
//! - [`MemoryFileOperations`]: an instrumented in-memory backend with
//!   operation counters, latency and failure injection — the test double
//!   for engine concurrency tests
//!
//! # Contract
//!
//! A missing file is not an error: `read_all_bytes` returns `Ok(None)`.
//! Deleting a missing file or directory succeeds. Only one asynchronous
//! write is ever issued at a time by the engine; backends do not need to
//! support concurrent writers.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod disk;
pub mod memory;
pub mod prelude;

pub use disk::DiskFileOperations;
pub use memory::MemoryFileOperations;

use std::path::Path;

use async_trait::async_trait;
use savevault_errors::StorageError;

/// Wrapper for simple native platform file system operations.
#[async_trait]
pub trait FileOperations: Send + Sync {
    /// Prepare the backend for use. Called once by the engine before any
    /// other operation.
    fn initialize(&self) -> Result<(), StorageError>;

    /// Commit the backend's persistence layer.
    ///
    /// On platforms with sandboxed storage this maps to the platform's
    /// explicit flush; on plain disks it is a no-op. May stall the caller.
    fn save(&self) -> Result<(), StorageError>;

    /// Create a directory and any missing parents.
    fn create_directory(&self, path: &Path) -> Result<(), StorageError>;

    /// Delete a directory and its contents. Succeeds if it does not exist.
    fn delete_directory(&self, path: &Path) -> Result<(), StorageError>;

    /// Delete a file. Succeeds if it does not exist.
    fn delete_file(&self, path: &Path) -> Result<(), StorageError>;

    /// Write the full contents of a file, replacing any previous contents.
    fn write_all_bytes(&self, path: &Path, content: &[u8]) -> Result<(), StorageError>;

    /// Asynchronous variant of [`FileOperations::write_all_bytes`].
    async fn write_all_bytes_async(&self, path: &Path, content: &[u8])
    -> Result<(), StorageError>;

    /// Read the full contents of a file, or `None` if it does not exist.
    fn read_all_bytes(&self, path: &Path) -> Result<Option<Vec<u8>>, StorageError>;

    /// Asynchronous variant of [`FileOperations::read_all_bytes`].
    async fn read_all_bytes_async(&self, path: &Path) -> Result<Option<Vec<u8>>, StorageError>;
}
