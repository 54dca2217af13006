//! The storage engine.
//!
//! [`FileStorage`] composes the coalescing queue, the single-flight read
//! table, the cipher and the backend capability into typed load/save/delete
//! operations over a root-relative key namespace. It owns the background
//! write pump and the shutdown draining that guarantees zero data loss on
//! an orderly shutdown.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use savevault_backend::FileOperations;
use savevault_cipher::Cipher;
use savevault_errors::StorageError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::buffer::FileBuffer;
use crate::config::{FileStorageConfig, LoggingLevel, ShutdownArgs};
use crate::queue::CoalescingQueue;
use crate::read::ReadOperation;
use crate::result::{FileData, SaveResult};

/// Mutable engine state. The mutex around it is never held across an
/// await point.
struct WriteState {
    queue: CoalescingQueue,
    active: Option<FileBuffer>,
    /// Payloads whose asynchronous write failed or timed out; still served
    /// to reads and re-written by the next flush.
    retry: HashMap<PathBuf, String>,
    reads: HashMap<PathBuf, Arc<ReadOperation>>,
    cancel: watch::Sender<bool>,
    shutdown: bool,
}

struct WriteJob {
    buffer: FileBuffer,
    bytes: Option<Vec<u8>>,
    cancel: watch::Receiver<bool>,
}

enum WriteOutcome {
    Completed,
    Failed(StorageError),
    TimedOut,
    Cancelled,
}

/// Durable, encrypted, key-addressed storage engine.
///
/// Keys are paths relative to the engine root. Saves are buffered through
/// the write-coalescing queue (unless the engine is in forced-synchronous
/// mode) and drained to the backend one at a time by a background pump
/// task. Loads consult the pending-write buffers before the backend, so a
/// load never observes a version of a key older than the most recently
/// issued save from this process.
pub struct FileStorage {
    data_path: PathBuf,
    encryption_key: String,
    cipher: Arc<dyn Cipher>,
    ops: Arc<dyn FileOperations>,
    force_synchronous: bool,
    error_logging: LoggingLevel,
    write_timeout: Duration,
    state: Mutex<WriteState>,
    work: Notify,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl FileStorage {
    /// Construct and start an engine.
    ///
    /// Initializes the backend, creates the root directory and — unless
    /// the engine is in forced-synchronous mode — spawns the write pump,
    /// so the call must be made inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns the backend error when initialization or root-directory
    /// creation fails.
    pub fn initialize(config: FileStorageConfig) -> Result<Arc<Self>, StorageError> {
        info!(root = %config.root_folder, "storage initialization started");

        let data_path = config.base_dir.join(&config.root_folder);
        config.file_operations.initialize()?;
        config.file_operations.create_directory(&data_path)?;

        let (cancel, _) = watch::channel(false);
        let storage = Arc::new(Self {
            data_path,
            encryption_key: config.encryption_key,
            cipher: config.cipher,
            ops: config.file_operations,
            force_synchronous: config.force_synchronous,
            error_logging: config.error_logging,
            write_timeout: config.write_timeout,
            state: Mutex::new(WriteState {
                queue: CoalescingQueue::new(),
                active: None,
                retry: HashMap::new(),
                reads: HashMap::new(),
                cancel,
                shutdown: false,
            }),
            work: Notify::new(),
            pump: Mutex::new(None),
        });

        if !storage.force_synchronous {
            let handle = tokio::spawn(Self::run_pump(Arc::clone(&storage)));
            *storage.pump.lock() = Some(handle);
        }

        info!("storage initialization completed");
        Ok(storage)
    }

    /// Root directory all keys resolve under.
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Whether the engine bypasses the write queue entirely.
    pub fn force_synchronous(&self) -> bool {
        self.force_synchronous
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.data_path.join(key)
    }

    // ---- typed / raw loads ------------------------------------------------

    /// Load and decode the value stored under `key`.
    pub async fn load_async<T: DeserializeOwned>(&self, key: &str) -> FileData<T> {
        let path = self.file_path(key);
        match self.read_internal_async(&path).await {
            Some(text) => self.decode(&path, &text),
            None => FileData::from_failure(),
        }
    }

    /// Load the raw decoded text stored under `key`.
    pub async fn load_raw_async(&self, key: &str) -> FileData<String> {
        let path = self.file_path(key);
        match self.read_internal_async(&path).await {
            Some(text) => FileData::from_success(text),
            None => FileData::from_failure(),
        }
    }

    /// Synchronous variant of [`FileStorage::load_async`].
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> FileData<T> {
        let path = self.file_path(key);
        match self.read_internal(&path) {
            Some(text) => self.decode(&path, &text),
            None => FileData::from_failure(),
        }
    }

    /// Synchronous variant of [`FileStorage::load_raw_async`].
    pub fn load_raw(&self, key: &str) -> FileData<String> {
        let path = self.file_path(key);
        match self.read_internal(&path) {
            Some(text) => FileData::from_success(text),
            None => FileData::from_failure(),
        }
    }

    fn decode<T: DeserializeOwned>(&self, path: &Path, text: &str) -> FileData<T> {
        match serde_json::from_str(text) {
            Ok(value) => FileData::from_success(value),
            Err(err) => {
                let err = StorageError::decode(path, err.to_string());
                self.log_failure(&err);
                FileData::from_error(err)
            }
        }
    }

    // ---- saves ------------------------------------------------------------

    /// Encode `value` and buffer it for writing under `key`.
    ///
    /// The buffered payload is immediately visible to loads of the same
    /// key, even before it is flushed to the backend.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> SaveResult {
        let path = self.file_path(key);
        match serde_json::to_string(value) {
            Ok(data) => {
                self.write_internal(FileBuffer { path, data });
                SaveResult::from_success()
            }
            Err(err) => {
                let err = StorageError::encode(&path, err.to_string());
                self.log_failure(&err);
                SaveResult::from_error(err)
            }
        }
    }

    /// Buffer an already-encoded payload for writing under `key`.
    pub fn save_raw(&self, key: &str, data: impl Into<String>) -> SaveResult {
        let path = self.file_path(key);
        self.write_internal(FileBuffer {
            path,
            data: data.into(),
        });
        SaveResult::from_success()
    }

    // ---- deletes ----------------------------------------------------------

    /// Delete the file stored under `key`, discarding any pending write
    /// for it so the delete cannot be undone by a stale buffer.
    pub fn delete(&self, key: &str) {
        let path = self.file_path(key);
        {
            let mut state = self.state.lock();
            let _ = state.queue.remove(&path);
            let _ = state.retry.remove(&path);
        }
        if let Err(err) = self.ops.delete_file(&path) {
            self.log_failure(&err);
        }
    }

    /// Asynchronous variant of [`FileStorage::delete`].
    pub async fn delete_async(&self, key: &str) {
        self.delete(key);
    }

    /// Delete a folder under the engine root and everything in it.
    pub fn delete_folder(&self, folder: &str) {
        let path = self.file_path(folder);
        if let Err(err) = self.ops.delete_directory(&path) {
            self.log_failure(&err);
        }
    }

    /// Asynchronous variant of [`FileStorage::delete_folder`].
    pub async fn delete_folder_async(&self, folder: &str) {
        self.delete_folder(folder);
    }

    // ---- backend commit & shutdown ----------------------------------------

    /// Commit the backend's persistence layer. May stall the caller
    /// depending on the platform.
    pub fn save_backend(&self) {
        if let Err(err) = self.ops.save() {
            self.log_failure(&err);
        }
    }

    /// Drain all pending I/O and stop the engine.
    ///
    /// Every pending read is completed with a final synchronous backend
    /// read; every buffered write — active, queued and parked-for-retry —
    /// is re-written synchronously. No data buffered before this call is
    /// lost.
    pub fn shutdown(&self, _args: ShutdownArgs) {
        self.shutdown_internal();
    }

    /// Asynchronous variant of [`FileStorage::shutdown`]. With
    /// `force_synchronous` set it degrades to the synchronous path.
    pub async fn shutdown_async(&self, args: ShutdownArgs) {
        self.shutdown_internal();
        if !args.force_synchronous {
            tokio::task::yield_now().await;
        }
    }

    fn shutdown_internal(&self) {
        self.state.lock().shutdown = true;
        self.flush_read_operations();
        self.flush_write_operations();
        // The pump is parked or has observed the cancellation by now.
        self.work.notify_one();
        if let Some(handle) = self.pump.lock().take() {
            handle.abort();
        }
    }

    fn flush_read_operations(&self) {
        let pending: Vec<Arc<ReadOperation>> = {
            let mut state = self.state.lock();
            state.reads.drain().map(|(_, op)| op).collect()
        };
        if pending.is_empty() {
            return;
        }
        info!(count = pending.len(), "flushing read operations");
        for op in pending {
            let bytes = match self.ops.read_all_bytes(op.path()) {
                Ok(bytes) => bytes,
                Err(err) => {
                    self.log_failure(&err);
                    None
                }
            };
            op.force_complete(bytes);
        }
    }

    fn flush_write_operations(&self) {
        let (active, queued, parked) = {
            let mut state = self.state.lock();
            let count =
                state.queue.len() + usize::from(state.active.is_some()) + state.retry.len();
            info!(count, "flushing write operations");
            state.cancel.send_replace(true);
            let (cancel, _) = watch::channel(false);
            state.cancel = cancel;
            let parked: Vec<(PathBuf, String)> = state.retry.drain().collect();
            (state.active.take(), state.queue.drain(), parked)
        };
        if let Some(buffer) = active {
            self.write_buffer_sync(&buffer.path, &buffer.data);
        }
        for buffer in queued {
            self.write_buffer_sync(&buffer.path, &buffer.data);
        }
        for (path, data) in parked {
            self.write_buffer_sync(&path, &data);
        }
    }

    // ---- write queue ------------------------------------------------------

    fn write_internal(&self, buffer: FileBuffer) {
        if self.force_synchronous {
            self.write_buffer_sync(&buffer.path, &buffer.data);
            return;
        }
        {
            let mut state = self.state.lock();
            // A newer payload supersedes a parked retry for the same key.
            let _ = state.retry.remove(&buffer.path);
            let _ = state.queue.upsert(buffer);
        }
        self.work.notify_one();
    }

    async fn run_pump(storage: Arc<Self>) {
        loop {
            storage.work.notified().await;
            loop {
                let Some(job) = storage.begin_next_write() else {
                    break;
                };
                if !storage.write_active_buffer(job).await {
                    break;
                }
            }
            if storage.state.lock().shutdown {
                return;
            }
        }
    }

    /// Pop the next queued buffer into the active slot and prepare its
    /// write, force-completing any pending read of the same path with the
    /// about-to-be-written bytes.
    fn begin_next_write(&self) -> Option<WriteJob> {
        let (buffer, read_op, cancel) = {
            let mut state = self.state.lock();
            if state.shutdown || state.active.is_some() {
                return None;
            }
            let buffer = state.queue.pop_front()?;
            state.active = Some(buffer.clone());
            let read_op = state.reads.remove(&buffer.path);
            (buffer, read_op, state.cancel.subscribe())
        };
        let bytes = self.encrypt(&buffer.path, &buffer.data);
        if let Some(op) = read_op {
            op.force_complete(bytes.clone());
        }
        Some(WriteJob {
            buffer,
            bytes,
            cancel,
        })
    }

    /// Perform one asynchronous backend write. Returns `false` when the
    /// write was cancelled by a flush and the pump must park.
    async fn write_active_buffer(&self, job: WriteJob) -> bool {
        let WriteJob {
            buffer,
            bytes,
            mut cancel,
        } = job;

        let Some(bytes) = bytes else {
            self.log_failure(&StorageError::cipher(&buffer.path, "cipher produced no output"));
            self.state.lock().active = None;
            return true;
        };

        if let Some(parent) = buffer.path.parent() {
            if let Err(err) = self.ops.create_directory(parent) {
                self.log_failure(&err);
            }
        }

        debug!(path = ?buffer.path, "start writing async");
        let write = self.ops.write_all_bytes_async(&buffer.path, &bytes);
        let outcome = tokio::select! {
            result = tokio::time::timeout(self.write_timeout, write) => match result {
                Ok(Ok(())) => WriteOutcome::Completed,
                Ok(Err(err)) => WriteOutcome::Failed(err),
                Err(_) => WriteOutcome::TimedOut,
            },
            _ = cancel.wait_for(|cancelled| *cancelled) => WriteOutcome::Cancelled,
        };

        match outcome {
            WriteOutcome::Completed => {
                debug!(path = ?buffer.path, "stop writing async");
                self.state.lock().active = None;
                true
            }
            WriteOutcome::Failed(err) => {
                self.log_failure(&err);
                self.park_failed_write(buffer);
                true
            }
            WriteOutcome::TimedOut => {
                self.log_failure(&StorageError::write_timeout(
                    &buffer.path,
                    self.write_timeout,
                ));
                self.park_failed_write(buffer);
                true
            }
            WriteOutcome::Cancelled => {
                // The flush that cancelled us takes over the active buffer
                // and re-writes it synchronously.
                debug!(path = ?buffer.path, "write cancelled by flush");
                false
            }
        }
    }

    /// Keep a failed or timed-out payload in memory for the next flush,
    /// unless a newer write for the key is already queued. During shutdown
    /// the flush may already have drained, so write through immediately.
    fn park_failed_write(&self, buffer: FileBuffer) {
        let write_through = {
            let mut state = self.state.lock();
            state.active = None;
            if state.shutdown {
                true
            } else {
                if !state.queue.contains(&buffer.path) {
                    let _ = state.retry.insert(buffer.path.clone(), buffer.data.clone());
                }
                false
            }
        };
        if write_through {
            self.write_buffer_sync(&buffer.path, &buffer.data);
        }
    }

    fn write_buffer_sync(&self, path: &Path, data: &str) {
        let Some(bytes) = self.encrypt(path, data) else {
            return;
        };
        if let Some(parent) = path.parent() {
            if let Err(err) = self.ops.create_directory(parent) {
                self.log_failure(&err);
            }
        }
        let read_op = self.state.lock().reads.remove(path);
        if let Some(op) = read_op {
            op.force_complete(Some(bytes.clone()));
        }
        debug!(path = ?path, "start writing");
        if let Err(err) = self.ops.write_all_bytes(path, &bytes) {
            self.log_failure(&err);
        }
        debug!(path = ?path, "stop writing");
    }

    // ---- reads ------------------------------------------------------------

    /// Pending payload for `path`, if any. The queue is consulted before
    /// the active buffer: a queued entry is never older than the active
    /// one for the same key, and is newer when the key was re-enqueued
    /// while its previous payload was mid-write.
    fn buffered_payload(state: &WriteState, path: &Path) -> Option<String> {
        if let Some(data) = state.queue.get(path) {
            return Some(data.to_string());
        }
        if let Some(active) = &state.active {
            if active.path.as_path() == path {
                return Some(active.data.clone());
            }
        }
        state.retry.get(path).cloned()
    }

    async fn read_internal_async(&self, path: &Path) -> Option<String> {
        if self.force_synchronous {
            return self.read_internal(path);
        }
        let op = {
            let mut state = self.state.lock();
            if let Some(data) = Self::buffered_payload(&state, path) {
                return Some(data);
            }
            Arc::clone(
                state
                    .reads
                    .entry(path.to_path_buf())
                    .or_insert_with(|| Arc::new(ReadOperation::new(path.to_path_buf()))),
            )
        };

        let bytes = op.read(self.ops.as_ref()).await;

        {
            let mut state = self.state.lock();
            let same = state
                .reads
                .get(path)
                .is_some_and(|current| Arc::ptr_eq(current, &op));
            if same {
                let _ = state.reads.remove(path);
            }
        }

        self.decrypt(path, &bytes?)
    }

    fn read_internal(&self, path: &Path) -> Option<String> {
        {
            let state = self.state.lock();
            if let Some(data) = Self::buffered_payload(&state, path) {
                return Some(data);
            }
        }

        debug!(path = ?path, "start reading");
        let bytes = match self.ops.read_all_bytes(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                self.log_failure(&err);
                None
            }
        };
        debug!(path = ?path, "stop reading");

        let pending = self.state.lock().reads.remove(path);
        if let Some(op) = pending {
            op.force_complete(bytes.clone());
        }

        self.decrypt(path, &bytes?)
    }

    // ---- cipher pass ------------------------------------------------------

    fn encrypt(&self, path: &Path, data: &str) -> Option<Vec<u8>> {
        let bytes = self.cipher.encrypt(data, &self.encryption_key);
        if bytes.is_none() && !data.is_empty() {
            self.log_failure(&StorageError::cipher(path, "encrypt produced no output"));
        }
        bytes
    }

    fn decrypt(&self, path: &Path, bytes: &[u8]) -> Option<String> {
        let text = self.cipher.decrypt(bytes, &self.encryption_key);
        if text.is_none() && !bytes.is_empty() {
            self.log_failure(&StorageError::cipher(path, "decrypt produced no output"));
        }
        text
    }

    // ---- logging ----------------------------------------------------------

    fn log_failure(&self, failure: &StorageError) {
        match self.error_logging {
            LoggingLevel::None => {}
            LoggingLevel::Message => debug!(%failure, "storage failure"),
            LoggingLevel::Warning => warn!(%failure, "storage failure"),
            LoggingLevel::Error => error!(%failure, "storage failure"),
        }
    }
}

impl Drop for FileStorage {
    fn drop(&mut self) {
        if let Some(handle) = self.pump.lock().take() {
            handle.abort();
        }
    }
}
