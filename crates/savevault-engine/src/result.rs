//! Result values for storage operations.
//!
//! The engine converts every internal failure into one of these values at
//! its boundary; callers never see a propagated error or a panic. Failed
//! loads carry the causing [`StorageError`] for diagnostics and expose a
//! default-valued payload so no caller ever dereferences a missing value.

use savevault_errors::StorageError;

/// Outcome of a load: a decoded payload or the reason there is none.
#[derive(Debug)]
#[must_use]
pub struct FileData<T> {
    value: Option<T>,
    error: Option<StorageError>,
}

impl<T> FileData<T> {
    /// A successful load carrying the decoded value.
    pub fn from_success(value: T) -> Self {
        Self {
            value: Some(value),
            error: None,
        }
    }

    /// A failed load with no underlying error (the file does not exist).
    pub fn from_failure() -> Self {
        Self {
            value: None,
            error: None,
        }
    }

    /// A failed load caused by `error`.
    pub fn from_error(error: StorageError) -> Self {
        Self {
            value: None,
            error: Some(error),
        }
    }

    /// Whether the load produced a value.
    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    /// The decoded value, if the load succeeded.
    pub fn read(self) -> Option<T> {
        self.value
    }

    /// The decoded value, or `T::default()` when the load failed.
    pub fn read_or_default(self) -> T
    where
        T: Default,
    {
        self.value.unwrap_or_default()
    }

    /// The error that caused the failure, if any.
    pub fn error(&self) -> Option<&StorageError> {
        self.error.as_ref()
    }

    /// Map the decoded value, preserving failure state.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FileData<U> {
        FileData {
            value: self.value.map(f),
            error: self.error,
        }
    }
}

/// Outcome of a save.
#[derive(Debug)]
#[must_use]
pub struct SaveResult {
    error: Option<StorageError>,
}

impl SaveResult {
    /// A successful save.
    pub fn from_success() -> Self {
        Self { error: None }
    }

    /// A failed save caused by `error`.
    pub fn from_error(error: StorageError) -> Self {
        Self { error: Some(error) }
    }

    /// Whether the save was accepted.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The error that caused the failure, if any.
    pub fn error(&self) -> Option<&StorageError> {
        self.error.as_ref()
    }
}
