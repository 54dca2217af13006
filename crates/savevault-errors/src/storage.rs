//! Storage engine and backend error types.
//!
//! These errors cover backend I/O, the encryption pass and the
//! serialization boundary. The storage engine converts every one of them
//! into a failed result value; they never cross the engine boundary as a
//! propagated error.

use std::path::PathBuf;
use std::time::Duration;

use crate::common::ErrorSeverity;

/// Errors produced by the storage engine and its backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to read a file from the backend
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        /// Path to the file
        path: PathBuf,
        /// Source error
        source: std::io::Error,
    },

    /// Failed to write a file to the backend
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        /// Path to the file
        path: PathBuf,
        /// Source error
        source: std::io::Error,
    },

    /// An asynchronous write did not complete within the configured bound
    #[error("Write of {path} timed out after {timeout:?}")]
    WriteTimeout {
        /// Path to the file
        path: PathBuf,
        /// The configured timeout
        timeout: Duration,
    },

    /// An asynchronous operation was cancelled by a flush or shutdown
    #[error("Operation on {path} was cancelled")]
    Cancelled {
        /// Path to the file
        path: PathBuf,
    },

    /// Failed to create a directory
    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreationFailed {
        /// Path to the directory
        path: PathBuf,
        /// Source error
        source: std::io::Error,
    },

    /// Failed to delete a file or directory
    #[error("Failed to delete {path}: {source}")]
    DeleteFailed {
        /// Path to the file or directory
        path: PathBuf,
        /// Source error
        source: std::io::Error,
    },

    /// The requested file does not exist on the backend
    #[error("File not found: {path}")]
    NotFound {
        /// Path to the file
        path: PathBuf,
    },

    /// Decoding a payload into a typed value failed
    #[error("Failed to decode {path}: {reason}")]
    Decode {
        /// Path to the file
        path: PathBuf,
        /// Codec failure description
        reason: String,
    },

    /// Encoding a typed value into a payload failed
    #[error("Failed to encode {path}: {reason}")]
    Encode {
        /// Path to the file
        path: PathBuf,
        /// Codec failure description
        reason: String,
    },

    /// The cipher rejected a payload
    #[error("Cipher failure for {path}: {reason}")]
    Cipher {
        /// Path to the file
        path: PathBuf,
        /// Cipher failure description
        reason: String,
    },

    /// Backend-level commit failed
    #[error("Backend save failed: {reason}")]
    BackendSaveFailed {
        /// Failure description
        reason: String,
    },
}

impl StorageError {
    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            StorageError::ReadFailed { .. } => ErrorSeverity::Error,
            StorageError::WriteFailed { .. } => ErrorSeverity::Error,
            StorageError::WriteTimeout { .. } => ErrorSeverity::Error,
            StorageError::Cancelled { .. } => ErrorSeverity::Warning,
            StorageError::DirectoryCreationFailed { .. } => ErrorSeverity::Error,
            StorageError::DeleteFailed { .. } => ErrorSeverity::Warning,
            StorageError::NotFound { .. } => ErrorSeverity::Info,
            StorageError::Decode { .. } => ErrorSeverity::Error,
            StorageError::Encode { .. } => ErrorSeverity::Error,
            StorageError::Cipher { .. } => ErrorSeverity::Error,
            StorageError::BackendSaveFailed { .. } => ErrorSeverity::Error,
        }
    }

    /// Check if the operation that produced this error can be retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::ReadFailed { .. }
                | StorageError::WriteFailed { .. }
                | StorageError::WriteTimeout { .. }
                | StorageError::Cancelled { .. }
                | StorageError::BackendSaveFailed { .. }
        )
    }

    /// Create a read error.
    pub fn read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::ReadFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a write error.
    pub fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::WriteFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a write timeout error.
    pub fn write_timeout(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        StorageError::WriteTimeout {
            path: path.into(),
            timeout,
        }
    }

    /// Create a directory creation error.
    pub fn directory_creation_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::DirectoryCreationFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a delete error.
    pub fn delete_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::DeleteFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a not-found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        StorageError::NotFound { path: path.into() }
    }

    /// Create a decode error.
    pub fn decode(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        StorageError::Decode {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an encode error.
    pub fn encode(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        StorageError::Encode {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a cipher error.
    pub fn cipher(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        StorageError::Cipher {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
