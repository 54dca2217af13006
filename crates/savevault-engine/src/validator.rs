//! File-key sanitization and profile-name validation.

use std::path::Path;

use tracing::warn;

const DEFAULT_EXTENSION: &str = ".sav";

/// Validates and sanitizes file keys and profile names.
///
/// Every key is sanitized before it touches the backend or any cache:
/// keys without an extension get the configured default appended, and when
/// an extension allow-list is enforced, unrecognized extensions are
/// replaced. Sanitization is deterministic and idempotent for a fixed
/// configuration.
#[derive(Debug, Clone)]
pub struct FileValidator {
    extension: String,
    allowed: Option<Vec<String>>,
    warn_missing_extension: bool,
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSION, None, false)
    }
}

impl FileValidator {
    /// Create a validator with the given default extension, optional
    /// extension allow-list and missing-extension warning toggle.
    ///
    /// An invalid default extension (anything but `.` followed by
    /// alphanumerics) falls back to `.sav`. The default extension is
    /// always part of the allow-list.
    pub fn new(
        extension: &str,
        enforce_extensions: Option<&[String]>,
        warn_missing_extension: bool,
    ) -> Self {
        let extension = if Self::is_valid_extension(extension) {
            extension.to_string()
        } else {
            DEFAULT_EXTENSION.to_string()
        };
        let allowed = enforce_extensions.map(|list| {
            let mut allowed: Vec<String> = list
                .iter()
                .filter(|candidate| Self::is_valid_extension(candidate))
                .cloned()
                .collect();
            if !allowed.contains(&extension) {
                allowed.push(extension.clone());
            }
            allowed
        });
        Self {
            extension,
            allowed,
            warn_missing_extension,
        }
    }

    /// The default extension appended to keys without one.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Sanitize a file key so it carries a recognized extension.
    pub fn sanitize(&self, key: &str) -> String {
        let current = Path::new(key).extension().and_then(|ext| ext.to_str());
        let Some(current) = current else {
            if self.warn_missing_extension {
                warn!(key, extension = %self.extension, "key has no extension, appending default");
            }
            return format!("{key}{}", self.extension);
        };

        let Some(allowed) = &self.allowed else {
            return key.to_string();
        };

        let dotted = format!(".{current}");
        if allowed.iter().any(|ext| ext == &dotted) {
            return key.to_string();
        }

        warn!(key, rejected = %dotted, replacement = %self.extension, "key has an unrecognized extension, replacing");
        let trimmed = self.extension.trim_start_matches('.');
        Path::new(key)
            .with_extension(trimmed)
            .to_string_lossy()
            .into_owned()
    }

    /// A profile name may contain only alphanumeric characters and spaces.
    pub fn is_valid_profile_name(&self, name: &str) -> bool {
        !name.trim().is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == ' ')
    }

    fn is_valid_extension(extension: &str) -> bool {
        let Some(rest) = extension.strip_prefix('.') else {
            return false;
        };
        !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_appends_default_extension() {
        let validator = FileValidator::default();
        assert_eq!(validator.sanitize("score"), "score.sav");
        assert_eq!(validator.sanitize("slot0/score"), "slot0/score.sav");
    }

    #[test]
    fn test_keeps_any_extension_without_allow_list() {
        let validator = FileValidator::default();
        assert_eq!(validator.sanitize("score.json"), "score.json");
    }

    #[test]
    fn test_replaces_unlisted_extension() {
        let allowed = vec![".sav".to_string()];
        let validator = FileValidator::new(".sav", Some(&allowed), false);
        assert_eq!(validator.sanitize("score.json"), "score.sav");
        assert_eq!(validator.sanitize("score.sav"), "score.sav");
    }

    #[test]
    fn test_invalid_default_falls_back() {
        let validator = FileValidator::new("no-dot", None, false);
        assert_eq!(validator.extension(), ".sav");
        let validator = FileValidator::new(".bad ext", None, false);
        assert_eq!(validator.extension(), ".sav");
    }

    #[test]
    fn test_profile_names() {
        let validator = FileValidator::default();
        assert!(validator.is_valid_profile_name("Save A"));
        assert!(validator.is_valid_profile_name("Slot1"));
        assert!(!validator.is_valid_profile_name(""));
        assert!(!validator.is_valid_profile_name("   "));
        assert!(!validator.is_valid_profile_name("save/../escape"));
        assert!(!validator.is_valid_profile_name("save_b"));
    }

    proptest! {
        #[test]
        fn prop_sanitize_is_idempotent(
            key in "[a-zA-Z0-9_]{1,16}(/[a-zA-Z0-9_]{1,16})?(\\.[a-z0-9]{1,6})?",
        ) {
            let allowed = vec![".sav".to_string(), ".json".to_string()];
            for validator in [
                FileValidator::default(),
                FileValidator::new(".sav", Some(&allowed), false),
            ] {
                let once = validator.sanitize(&key);
                prop_assert_eq!(validator.sanitize(&once), once.clone());
            }
        }
    }
}
