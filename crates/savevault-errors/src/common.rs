//! Common error types and utilities used across all SaveVault crates.
//!
//! This module provides the top-level error enum that can wrap all
//! sub-errors, along with error classification and severity levels.

use core::fmt;

use crate::{ProfileError, StorageError, ValidationError};

/// Top-level error type that can wrap all SaveVault sub-errors.
///
/// This enum provides a unified error type for the entire project, allowing
/// easy error propagation and classification.
#[derive(Debug, thiserror::Error)]
pub enum SaveVaultError {
    /// The file system is not initialized.
    ///
    /// Reported distinctly from data errors so callers can retry the
    /// operation after awaiting initialization.
    #[error("File system is not initialized: {operation}")]
    NotInitialized {
        /// The operation that required an initialized file system
        operation: String,
    },

    /// Storage engine and backend errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Save-profile errors
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// I/O errors outside the storage engine boundary
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl SaveVaultError {
    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SaveVaultError::NotInitialized { .. } => ErrorCategory::Lifecycle,
            SaveVaultError::Storage(_) => ErrorCategory::Storage,
            SaveVaultError::Profile(_) => ErrorCategory::Profile,
            SaveVaultError::Validation(_) => ErrorCategory::Validation,
            SaveVaultError::Io(_) => ErrorCategory::Io,
            SaveVaultError::Config(_) => ErrorCategory::Config,
            SaveVaultError::Other(_) => ErrorCategory::Other,
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SaveVaultError::NotInitialized { .. } => ErrorSeverity::Warning,
            SaveVaultError::Storage(err) => err.severity(),
            SaveVaultError::Profile(err) => err.severity(),
            SaveVaultError::Validation(_) => ErrorSeverity::Error,
            SaveVaultError::Io(_) => ErrorSeverity::Error,
            SaveVaultError::Config(_) => ErrorSeverity::Error,
            SaveVaultError::Other(_) => ErrorSeverity::Error,
        }
    }

    /// Check if the operation that produced this error can be retried.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SaveVaultError::NotInitialized { .. } => true,
            SaveVaultError::Storage(err) => err.is_recoverable(),
            SaveVaultError::Profile(_) => false,
            SaveVaultError::Validation(_) => false,
            SaveVaultError::Io(_) => true,
            SaveVaultError::Config(_) => false,
            SaveVaultError::Other(_) => false,
        }
    }

    /// Create a not-initialized error for the named operation.
    pub fn not_initialized(operation: impl Into<String>) -> Self {
        SaveVaultError::NotInitialized {
            operation: operation.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        SaveVaultError::Config(message.into())
    }
}

impl From<std::io::Error> for SaveVaultError {
    fn from(err: std::io::Error) -> Self {
        SaveVaultError::Io(err)
    }
}

/// Classification of an error by subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Lifecycle state machine errors
    Lifecycle,
    /// Storage engine and backend errors
    Storage,
    /// Save-profile errors
    Profile,
    /// Validation errors
    Validation,
    /// I/O errors
    Io,
    /// Configuration errors
    Config,
    /// Uncategorized errors
    Other,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Lifecycle => "lifecycle",
            ErrorCategory::Storage => "storage",
            ErrorCategory::Profile => "profile",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Io => "io",
            ErrorCategory::Config => "config",
            ErrorCategory::Other => "other",
        };
        write!(f, "{name}")
    }
}

/// Severity level of an error, used for logging decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Informational, the operation succeeded with caveats
    Info,
    /// The operation failed but the system remains consistent
    Warning,
    /// The operation failed and data may not be durable
    Error,
    /// The system cannot continue operating
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorSeverity::Info => "info",
            ErrorSeverity::Warning => "warning",
            ErrorSeverity::Error => "error",
            ErrorSeverity::Critical => "critical",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_initialized_category() {
        let err = SaveVaultError::not_initialized("create_profile");
        assert_eq!(err.category(), ErrorCategory::Lifecycle);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_error_display_includes_operation() {
        let err = SaveVaultError::not_initialized("switch_profile");
        assert!(err.to_string().contains("switch_profile"));
    }

    #[test]
    fn test_wrapped_validation_error() {
        let err: SaveVaultError = ValidationError::BlankKey.into();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Warning < ErrorSeverity::Error);
        assert!(ErrorSeverity::Error < ErrorSeverity::Critical);
    }

    #[test]
    fn test_is_std_error() {
        let err = SaveVaultError::config("bad root folder");
        let _: &dyn std::error::Error = &err;
    }
}
