//! Per-file metadata tracked by a profile.

use chrono::{DateTime, Utc};
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use crate::options::StoreOptions;

/// Closed tag describing how a stored payload decodes.
///
/// `Value` payloads carry the generic [`crate::SaveData`] envelope and
/// decode eagerly on profile load; anything else is kept as an opaque raw
/// payload. A tag written by a newer version that this build does not
/// recognize deserializes as [`FileKind::Unknown`] and is treated as
/// opaque — never a decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Generic typed value wrapper ([`crate::SaveData`] envelope).
    Value,
    /// Opaque payload stored and returned as raw text.
    Blob,
    /// Tag written by an unrecognized producer; handled like a blob.
    Unknown,
}

impl FileKind {
    fn as_str(self) -> &'static str {
        match self {
            FileKind::Value => "value",
            FileKind::Blob => "blob",
            FileKind::Unknown => "unknown",
        }
    }
}

impl Serialize for FileKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FileKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(match tag.as_str() {
            "value" => FileKind::Value,
            "blob" => FileKind::Blob,
            _ => FileKind::Unknown,
        })
    }
}

/// Metadata persisted for every file a profile tracks.
///
/// Identity is `(file_name, kind)`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FileHeader {
    /// Sanitized file name, relative to the profile folder.
    pub file_name: String,
    /// How the payload decodes.
    pub kind: FileKind,
    /// When the file was last written through this profile.
    pub last_modified: DateTime<Utc>,
    /// Whether the payload was stored with encryption requested.
    #[serde(default)]
    pub encrypted: bool,
    /// Free-form tags from [`StoreOptions`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// File system version that wrote the file.
    #[serde(default)]
    pub version: String,
}

impl FileHeader {
    /// Create a header for a freshly stored file.
    pub fn new(file_name: impl Into<String>, kind: FileKind, options: &StoreOptions, version: &str) -> Self {
        Self {
            file_name: file_name.into(),
            kind,
            last_modified: Utc::now(),
            encrypted: options.encrypted.unwrap_or(false),
            tags: options.tags.clone(),
            version: version.to_string(),
        }
    }

    /// Whether this header identifies the given file and kind.
    pub fn matches(&self, file_name: &str, kind: FileKind) -> bool {
        self.file_name == file_name && self.kind == kind
    }
}
