//! Instrumented in-memory backend.
//!
//! The test double for the engine's concurrency machinery: it records
//! per-path operation counts (to assert single-flight deduplication and
//! write coalescing), injects latency and failures, and can hold
//! asynchronous writes on a gate so tests control exactly when a write
//! "lands".

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use savevault_errors::StorageError;
use tokio::sync::watch;
use tracing::debug;

use crate::FileOperations;

#[derive(Debug, Default)]
struct MemoryState {
    files: HashMap<PathBuf, Vec<u8>>,
    read_counts: HashMap<PathBuf, u64>,
    write_counts: HashMap<PathBuf, u64>,
    save_count: u64,
    fail_writes: bool,
    fail_reads: bool,
}

/// In-memory backend with operation counters and fault injection.
#[derive(Debug)]
pub struct MemoryFileOperations {
    state: Mutex<MemoryState>,
    read_delay: Mutex<Option<Duration>>,
    write_delay: Mutex<Option<Duration>>,
    write_gate: watch::Sender<bool>,
}

impl Default for MemoryFileOperations {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFileOperations {
    /// Create an empty in-memory backend.
    pub fn new() -> Self {
        let (write_gate, _) = watch::channel(true);
        Self {
            state: Mutex::new(MemoryState::default()),
            read_delay: Mutex::new(None),
            write_delay: Mutex::new(None),
            write_gate,
        }
    }

    /// Delay every asynchronous read by the given duration.
    pub fn with_read_delay(self, delay: Duration) -> Self {
        *self.read_delay.lock() = Some(delay);
        self
    }

    /// Delay every asynchronous write by the given duration.
    pub fn with_write_delay(self, delay: Duration) -> Self {
        *self.write_delay.lock() = Some(delay);
        self
    }

    /// Make every write fail until [`MemoryFileOperations::set_fail_writes`]
    /// is called with `false`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// Make every read fail until cleared.
    pub fn set_fail_reads(&self, fail: bool) {
        self.state.lock().fail_reads = fail;
    }

    /// Hold all asynchronous writes until
    /// [`MemoryFileOperations::resume_async_writes`] is called.
    ///
    /// Synchronous writes are unaffected; the engine's shutdown drain uses
    /// them and must be able to land even while the gate is closed.
    pub fn pause_async_writes(&self) {
        self.write_gate.send_replace(false);
    }

    /// Release writes held by [`MemoryFileOperations::pause_async_writes`].
    pub fn resume_async_writes(&self) {
        self.write_gate.send_replace(true);
    }

    /// Number of backend reads issued for `path`.
    pub fn read_count(&self, path: &Path) -> u64 {
        self.state.lock().read_counts.get(path).copied().unwrap_or(0)
    }

    /// Number of backend writes that landed for `path`.
    pub fn write_count(&self, path: &Path) -> u64 {
        self.state
            .lock()
            .write_counts
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    /// Number of backend-level `save` commits.
    pub fn save_count(&self) -> u64 {
        self.state.lock().save_count
    }

    /// Check whether a file exists.
    pub fn contains(&self, path: &Path) -> bool {
        self.state.lock().files.contains_key(path)
    }

    /// Current contents of a file, if present.
    pub fn file(&self, path: &Path) -> Option<Vec<u8>> {
        self.state.lock().files.get(path).cloned()
    }

    /// Current contents of a file as UTF-8 text, if present and valid.
    pub fn file_text(&self, path: &Path) -> Option<String> {
        self.file(path).and_then(|bytes| String::from_utf8(bytes).ok())
    }

    /// Total number of stored files.
    pub fn file_count(&self) -> usize {
        self.state.lock().files.len()
    }

    fn write_sync(&self, path: &Path, content: &[u8]) -> Result<(), StorageError> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(StorageError::write_failed(
                path,
                std::io::Error::other("injected write failure"),
            ));
        }
        *state.write_counts.entry(path.to_path_buf()).or_default() += 1;
        state.files.insert(path.to_path_buf(), content.to_vec());
        debug!(path = ?path, bytes = content.len(), "memory write");
        Ok(())
    }

    fn read_sync(&self, path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
        let mut state = self.state.lock();
        if state.fail_reads {
            return Err(StorageError::read_failed(
                path,
                std::io::Error::other("injected read failure"),
            ));
        }
        *state.read_counts.entry(path.to_path_buf()).or_default() += 1;
        Ok(state.files.get(path).cloned())
    }
}

#[async_trait]
impl FileOperations for MemoryFileOperations {
    fn initialize(&self) -> Result<(), StorageError> {
        Ok(())
    }

    fn save(&self) -> Result<(), StorageError> {
        self.state.lock().save_count += 1;
        Ok(())
    }

    fn create_directory(&self, _path: &Path) -> Result<(), StorageError> {
        Ok(())
    }

    fn delete_directory(&self, path: &Path) -> Result<(), StorageError> {
        let mut state = self.state.lock();
        state.files.retain(|file, _| !file.starts_with(path));
        Ok(())
    }

    fn delete_file(&self, path: &Path) -> Result<(), StorageError> {
        self.state.lock().files.remove(path);
        Ok(())
    }

    fn write_all_bytes(&self, path: &Path, content: &[u8]) -> Result<(), StorageError> {
        self.write_sync(path, content)
    }

    async fn write_all_bytes_async(
        &self,
        path: &Path,
        content: &[u8],
    ) -> Result<(), StorageError> {
        let delay = *self.write_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut gate = self.write_gate.subscribe();
        if gate.wait_for(|open| *open).await.is_err() {
            return Err(StorageError::Cancelled {
                path: path.to_path_buf(),
            });
        }
        self.write_sync(path, content)
    }

    fn read_all_bytes(&self, path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
        self.read_sync(path)
    }

    async fn read_all_bytes_async(&self, path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
        let delay = *self.read_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.read_sync(path)
    }
}
