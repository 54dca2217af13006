//! Engine configuration.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use savevault_backend::{DiskFileOperations, FileOperations};
use savevault_cipher::{Cipher, PassthroughCipher};

/// How the engine logs its internally-caught failures.
///
/// Storage failures never escape the engine as errors; this controls the
/// level at which they are reported through `tracing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggingLevel {
    /// Failures are swallowed silently.
    None,
    /// Failures are logged at DEBUG.
    Message,
    /// Failures are logged at WARN.
    #[default]
    Warning,
    /// Failures are logged at ERROR.
    Error,
}

/// Arguments for an engine shutdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShutdownArgs {
    /// Force the shutdown to complete synchronously even on the
    /// asynchronous path.
    pub force_synchronous: bool,
}

impl ShutdownArgs {
    /// Shutdown arguments requesting a fully synchronous drain.
    pub fn synchronous() -> Self {
        Self {
            force_synchronous: true,
        }
    }
}

/// Construction arguments for a [`crate::FileStorage`] engine.
#[derive(Clone)]
pub struct FileStorageConfig {
    /// Host directory under which the engine root lives.
    pub base_dir: PathBuf,
    /// Root folder name (already version-suffixed by the caller when
    /// versioning is enabled).
    pub root_folder: String,
    /// Pass phrase handed to the cipher for every payload.
    pub encryption_key: String,
    /// Payload cipher. Defaults to the passthrough cipher.
    pub cipher: Arc<dyn Cipher>,
    /// Backend capability. Defaults to the local-disk backend.
    pub file_operations: Arc<dyn FileOperations>,
    /// When set, every operation is backend-synchronous and the write
    /// queue is bypassed entirely.
    pub force_synchronous: bool,
    /// Logging level for internally-caught failures.
    pub error_logging: LoggingLevel,
    /// Bound on a single asynchronous backend write; writes exceeding it
    /// are treated as failed.
    pub write_timeout: Duration,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            root_folder: "SaveGame".to_string(),
            encryption_key: String::new(),
            cipher: Arc::new(PassthroughCipher),
            file_operations: Arc::new(DiskFileOperations::new()),
            force_synchronous: false,
            error_logging: LoggingLevel::default(),
            write_timeout: Duration::from_secs(5),
        }
    }
}

impl FileStorageConfig {
    /// Create a configuration rooted at the given folder name.
    pub fn new(root_folder: impl Into<String>) -> Self {
        Self {
            root_folder: root_folder.into(),
            ..Self::default()
        }
    }
}

impl fmt::Debug for FileStorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStorageConfig")
            .field("base_dir", &self.base_dir)
            .field("root_folder", &self.root_folder)
            .field("force_synchronous", &self.force_synchronous)
            .field("error_logging", &self.error_logging)
            .field("write_timeout", &self.write_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FileStorageConfig::default();
        assert_eq!(config.root_folder, "SaveGame");
        assert_eq!(config.write_timeout, Duration::from_secs(5));
        assert!(!config.force_synchronous);
    }

    #[test]
    fn test_synchronous_shutdown_args() {
        assert!(ShutdownArgs::synchronous().force_synchronous);
        assert!(!ShutdownArgs::default().force_synchronous);
    }
}
