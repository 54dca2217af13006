//! Input validation error types.

/// Validation errors for keys, file extensions and profile names.
///
/// A blank key is a programmer error and is reported immediately by every
/// profile file operation instead of being silently ignored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A file key was empty or whitespace-only
    #[error("File key must not be blank")]
    BlankKey,

    /// A file extension did not match the `.alnum` shape
    #[error("Invalid file extension: {0}")]
    InvalidExtension(String),

    /// A profile name contained disallowed characters
    #[error("Invalid profile name {name}: {reason}")]
    InvalidProfileName {
        /// The rejected name
        name: String,
        /// The reason for rejection
        reason: String,
    },

    /// A value exceeded its maximum length
    #[error("{field} is {length} characters long (max: {max})")]
    TooLong {
        /// The field name
        field: String,
        /// Actual length
        length: usize,
        /// Maximum allowed length
        max: usize,
    },
}

impl ValidationError {
    /// Create an invalid-profile-name error.
    pub fn invalid_profile_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidProfileName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a too-long error.
    pub fn too_long(field: impl Into<String>, length: usize, max: usize) -> Self {
        ValidationError::TooLong {
            field: field.into(),
            length,
            max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_display() {
        assert!(ValidationError::BlankKey.to_string().contains("blank"));
    }

    #[test]
    fn test_too_long_display() {
        let err = ValidationError::too_long("profile name", 80, 64);
        let msg = err.to_string();
        assert!(msg.contains("80"));
        assert!(msg.contains("64"));
    }
}
