//! Save-profile error types.
//!
//! These cover profile loading, the header registry and lifecycle
//! operations on profiles. Profile *creation* failures are not errors; they
//! are reported as status codes by the file system so callers can present
//! them to users without unwinding.

use crate::common::ErrorSeverity;

/// Save-profile errors.
///
/// # Examples
///
/// ```
/// use savevault_errors::{ErrorSeverity, ProfileError};
///
/// let err = ProfileError::not_loaded("Slot0");
/// assert_eq!(err.severity(), ErrorSeverity::Error);
///
/// let err = ProfileError::active_profile("Slot0");
/// assert_eq!(err.severity(), ErrorSeverity::Warning);
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProfileError {
    /// Profile not found in the registry
    #[error("Profile not found: {0}")]
    NotFound(String),

    /// The profile has not been loaded yet
    #[error("Profile {0} is not loaded")]
    NotLoaded(String),

    /// The operation is not permitted on the active profile
    #[error("Profile {0} is the active profile and cannot be deleted")]
    ActiveProfile(String),

    /// A file was previously stored with a different payload shape
    #[error("File {file} in profile {profile} holds a different payload type")]
    TypeMismatch {
        /// Profile display name
        profile: String,
        /// File key
        file: String,
    },

    /// The profile file on the backend could not be decoded
    #[error("Failed to load profile from {path}: {reason}")]
    LoadFailed {
        /// Profile data path
        path: String,
        /// Failure reason
        reason: String,
    },
}

impl ProfileError {
    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ProfileError::NotFound(_) => ErrorSeverity::Error,
            ProfileError::NotLoaded(_) => ErrorSeverity::Error,
            ProfileError::ActiveProfile(_) => ErrorSeverity::Warning,
            ProfileError::TypeMismatch { .. } => ErrorSeverity::Warning,
            ProfileError::LoadFailed { .. } => ErrorSeverity::Error,
        }
    }

    /// Create a not-found error.
    pub fn not_found(profile: impl Into<String>) -> Self {
        ProfileError::NotFound(profile.into())
    }

    /// Create a not-loaded error.
    pub fn not_loaded(profile: impl Into<String>) -> Self {
        ProfileError::NotLoaded(profile.into())
    }

    /// Create an active-profile error.
    pub fn active_profile(profile: impl Into<String>) -> Self {
        ProfileError::ActiveProfile(profile.into())
    }

    /// Create a type-mismatch error.
    pub fn type_mismatch(profile: impl Into<String>, file: impl Into<String>) -> Self {
        ProfileError::TypeMismatch {
            profile: profile.into(),
            file: file.into(),
        }
    }

    /// Create a load-failed error.
    pub fn load_failed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        ProfileError::LoadFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_profile_severity() {
        assert_eq!(
            ProfileError::active_profile("Slot0").severity(),
            ErrorSeverity::Warning
        );
    }

    #[test]
    fn test_display() {
        let err = ProfileError::type_mismatch("Slot0", "score.sav");
        let msg = err.to_string();
        assert!(msg.contains("Slot0"));
        assert!(msg.contains("score.sav"));
    }

    #[test]
    fn test_is_std_error() {
        let err = ProfileError::not_found("Slot1");
        let _: &dyn std::error::Error = &err;
    }
}
