//! File system configuration.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use savevault_backend::FileOperations;
use savevault_cipher::Cipher;
use savevault_engine::LoggingLevel;
use tracing::warn;

use crate::converter::SaveConverter;

/// Built-in fallback pass phrase used when no encryption key is
/// configured.
pub const DEFAULT_ENCRYPTION_KEY: &str = "pXq7RkVnTzH4s";

/// Settings consumed by [`crate::FileSystem::initialize`].
#[derive(Clone)]
pub struct FileSystemSettings {
    /// Host directory the engine root is created under.
    pub base_dir: PathBuf,
    /// Root folder name for the file system.
    pub root_folder: String,
    /// Append the resolved version to the root folder name.
    pub append_version_to_root: bool,
    /// Version string used when [`Self::use_app_version`] is off.
    pub version: String,
    /// Host application version, masked per component when
    /// [`Self::use_app_version`] is on.
    pub app_version: Option<String>,
    /// Derive the version from [`Self::app_version`] instead of
    /// [`Self::version`].
    pub use_app_version: bool,
    /// Keep the major component of the application version.
    pub use_major_version: bool,
    /// Keep the minor component of the application version.
    pub use_minor_version: bool,
    /// Keep the patch component of the application version.
    pub use_patch_version: bool,
    /// Default extension appended to keys without one.
    pub file_extension: String,
    /// Optional extension allow-list; unrecognized extensions are
    /// replaced with the default.
    pub enforce_file_extensions: Option<Vec<String>>,
    /// Warn when a key arrives without an extension.
    pub warn_missing_extension: bool,
    /// Force every storage operation to be backend-synchronous.
    pub force_synchronous: bool,
    /// Name prefix for generated profiles; names matching
    /// `{prefix}{digits}` are reserved.
    pub default_profile_name: String,
    /// Maximum number of profiles; `0` means unlimited.
    pub profile_limit: u32,
    /// Encryption pass phrase; falls back to a built-in key when unset.
    pub encryption_key: Option<String>,
    /// Payload cipher; falls back to the passthrough cipher when unset.
    pub cipher: Option<Arc<dyn Cipher>>,
    /// Backend capability; falls back to the local-disk backend when
    /// unset.
    pub file_operations: Option<Arc<dyn FileOperations>>,
    /// Logging level for internally-caught storage failures.
    pub error_logging: LoggingLevel,
    /// Bound on a single asynchronous backend write.
    pub write_timeout: Duration,
    /// Legacy save converter, run once after initialization.
    pub converter: Option<Arc<dyn SaveConverter>>,
}

impl Default for FileSystemSettings {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            root_folder: "SaveGame".to_string(),
            append_version_to_root: true,
            version: "1.0.0".to_string(),
            app_version: None,
            use_app_version: false,
            use_major_version: true,
            use_minor_version: true,
            use_patch_version: false,
            file_extension: ".sav".to_string(),
            enforce_file_extensions: None,
            warn_missing_extension: false,
            force_synchronous: false,
            default_profile_name: "Slot".to_string(),
            profile_limit: 0,
            encryption_key: None,
            cipher: None,
            file_operations: None,
            error_logging: LoggingLevel::Warning,
            write_timeout: Duration::from_secs(5),
            converter: None,
        }
    }
}

impl FileSystemSettings {
    /// The version string recorded into headers and appended to the root
    /// folder.
    ///
    /// With [`Self::use_app_version`] set, the application version is
    /// masked per component (`1.2.3` with the patch component off becomes
    /// `1.2.x`); a version that does not parse as three segments is used
    /// verbatim.
    pub fn resolved_version(&self) -> String {
        if !self.use_app_version {
            return self.version.clone();
        }
        let raw = self
            .app_version
            .clone()
            .unwrap_or_else(|| self.version.clone());
        let segments: Vec<&str> = raw.split('.').collect();
        let [major, minor, patch] = segments.as_slice() else {
            warn!(version = %raw, "application version is not major.minor.patch, using it verbatim");
            return raw;
        };
        if major.trim().is_empty() || minor.trim().is_empty() || patch.trim().is_empty() {
            warn!(version = %raw, "application version has empty components, using it verbatim");
            return raw;
        }
        let mask = |enabled: bool, segment: &str| {
            if enabled {
                segment.to_string()
            } else {
                "x".to_string()
            }
        };
        format!(
            "{}.{}.{}",
            mask(self.use_major_version, major),
            mask(self.use_minor_version, minor),
            mask(self.use_patch_version, patch)
        )
    }

    /// Root folder name, version-suffixed when configured.
    pub fn root_folder_name(&self, version: &str) -> String {
        if self.append_version_to_root && !version.is_empty() {
            format!("{}_{}", self.root_folder, version)
        } else {
            self.root_folder.clone()
        }
    }
}

impl fmt::Debug for FileSystemSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSystemSettings")
            .field("base_dir", &self.base_dir)
            .field("root_folder", &self.root_folder)
            .field("append_version_to_root", &self.append_version_to_root)
            .field("version", &self.version)
            .field("force_synchronous", &self.force_synchronous)
            .field("default_profile_name", &self.default_profile_name)
            .field("profile_limit", &self.profile_limit)
            .field("error_logging", &self.error_logging)
            .finish_non_exhaustive()
    }
}
