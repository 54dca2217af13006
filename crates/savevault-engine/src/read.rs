//! Single-flight asynchronous read operations.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use savevault_backend::FileOperations;
use tokio::sync::watch;
use tracing::{debug, warn};

/// An asynchronous read that may be cancelled or force-completed at any
/// point.
///
/// All concurrent readers of one path share a single operation: the first
/// caller drives the backend read, everyone awaits the same completion. A
/// write for the path force-completes the operation with the bytes about
/// to be written; the in-flight backend read is cancelled and its late
/// result, if any, is discarded. Completion happens exactly once.
pub(crate) struct ReadOperation {
    path: PathBuf,
    cancel: watch::Sender<bool>,
    completion: watch::Sender<Option<Option<Vec<u8>>>>,
    started: AtomicBool,
}

impl ReadOperation {
    pub(crate) fn new(path: PathBuf) -> Self {
        let (cancel, _) = watch::channel(false);
        let (completion, _) = watch::channel(None);
        Self {
            path,
            cancel,
            completion,
            started: AtomicBool::new(false),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Complete the operation with the given bytes (`None` = missing
    /// file). A second completion is a no-op; the in-flight backend read,
    /// if any, is cancelled.
    pub(crate) fn force_complete(&self, bytes: Option<Vec<u8>>) {
        let completed = self.completion.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(bytes);
            true
        });
        if completed {
            self.cancel.send_replace(true);
        }
    }

    /// Resolve the operation: drive the backend read if nobody has yet,
    /// then await the shared completion.
    pub(crate) async fn read(&self, ops: &dyn FileOperations) -> Option<Vec<u8>> {
        if !self.started.swap(true, Ordering::AcqRel) {
            let mut cancelled = self.cancel.subscribe();
            debug!(path = ?self.path, "read async started");
            tokio::select! {
                result = ops.read_all_bytes_async(&self.path) => {
                    match result {
                        Ok(bytes) => {
                            debug!(path = ?self.path, "read async completed");
                            self.force_complete(bytes);
                        }
                        Err(error) => {
                            warn!(path = ?self.path, %error, "read async failed");
                            self.force_complete(None);
                        }
                    }
                }
                _ = cancelled.wait_for(|flag| *flag) => {
                    warn!(path = ?self.path, "read was force completed");
                }
            }
        }
        self.wait().await
    }

    async fn wait(&self) -> Option<Vec<u8>> {
        let mut completion = self.completion.subscribe();
        match completion.wait_for(|slot| slot.is_some()).await {
            Ok(slot) => slot.as_ref().and_then(|bytes| bytes.clone()),
            // The sender lives inside self, so this arm is unreachable in
            // practice; a missing result is treated as a missing file.
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use savevault_backend::MemoryFileOperations;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_read_resolves_from_backend() {
        let ops = MemoryFileOperations::new();
        let path = PathBuf::from("slot0/x.sav");
        let _ = ops.write_all_bytes(&path, b"payload");

        let op = ReadOperation::new(path.clone());
        assert_eq!(op.read(&ops).await, Some(b"payload".to_vec()));
        assert_eq!(ops.read_count(&path), 1);
    }

    #[tokio::test]
    async fn test_concurrent_readers_share_one_backend_read() {
        let ops = Arc::new(
            MemoryFileOperations::new().with_read_delay(Duration::from_millis(10)),
        );
        let path = PathBuf::from("slot0/x.sav");
        let _ = ops.write_all_bytes(&path, b"payload");

        let op = Arc::new(ReadOperation::new(path.clone()));
        let (a, b, c) = tokio::join!(
            op.read(ops.as_ref()),
            op.read(ops.as_ref()),
            op.read(ops.as_ref())
        );

        assert_eq!(a, Some(b"payload".to_vec()));
        assert_eq!(b, Some(b"payload".to_vec()));
        assert_eq!(c, Some(b"payload".to_vec()));
        assert_eq!(ops.read_count(&path), 1);
    }

    #[tokio::test]
    async fn test_force_complete_preempts_backend() {
        let ops = Arc::new(
            MemoryFileOperations::new().with_read_delay(Duration::from_secs(5)),
        );
        let path = PathBuf::from("slot0/x.sav");
        let _ = ops.write_all_bytes(&path, b"stale");

        let op = Arc::new(ReadOperation::new(path.clone()));
        let reader = {
            let op = Arc::clone(&op);
            let ops = Arc::clone(&ops);
            tokio::spawn(async move { op.read(ops.as_ref()).await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        op.force_complete(Some(b"fresh".to_vec()));

        let result = reader.await.unwrap_or(None);
        assert_eq!(result, Some(b"fresh".to_vec()));
    }

    #[tokio::test]
    async fn test_second_completion_is_ignored() {
        let op = ReadOperation::new(PathBuf::from("x.sav"));
        op.force_complete(Some(b"first".to_vec()));
        op.force_complete(Some(b"second".to_vec()));
        assert_eq!(op.wait().await, Some(b"first".to_vec()));
    }
}
