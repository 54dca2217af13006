//! The generic typed value envelope.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope persisted for every typed value a profile stores.
///
/// The payload is kept as a [`serde_json::Value`] so the profile can hold
/// values of arbitrary types in one cache; typed access decodes the value
/// on demand through serde. This replaces the stored-type-name dispatch a
/// reflective implementation would use: the shape is closed, and a payload
/// that does not decode into the requested type is a graceful `None`,
/// never a failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveData {
    /// Sanitized file name the value is stored under.
    pub file_name: String,
    /// When the value was first stored.
    pub created_at: DateTime<Utc>,
    /// When the value was last written.
    pub modified_at: DateTime<Utc>,
    /// File system version that wrote the value.
    #[serde(default)]
    pub file_system_version: String,
    /// Free-form tags from the store options.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// The encoded payload.
    pub value: Value,
}

impl SaveData {
    /// Create an envelope for a freshly stored value.
    pub fn new(
        file_name: impl Into<String>,
        value: Value,
        version: &str,
        tags: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            file_name: file_name.into(),
            created_at: now,
            modified_at: now,
            file_system_version: version.to_string(),
            tags,
            value,
        }
    }

    /// Replace the payload, refreshing the modification metadata.
    pub fn update(&mut self, value: Value, version: &str) {
        self.value = value;
        self.modified_at = Utc::now();
        self.file_system_version = version.to_string();
    }

    /// Decode the payload into `T`, or `None` when the stored shape does
    /// not match.
    pub fn decode<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(self.value.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_matching_type() {
        let data = SaveData::new("x.sav", serde_json::json!(7), "1.0", Vec::new());
        assert_eq!(data.decode::<u32>(), Some(7));
    }

    #[test]
    fn test_decode_mismatched_type_is_none() {
        let data = SaveData::new("x.sav", serde_json::json!("text"), "1.0", Vec::new());
        assert_eq!(data.decode::<u32>(), None);
    }

    #[test]
    fn test_update_refreshes_metadata() {
        let mut data = SaveData::new("x.sav", serde_json::json!(1), "1.0", Vec::new());
        let created = data.created_at;
        data.update(serde_json::json!(2), "1.1");
        assert_eq!(data.created_at, created);
        assert_eq!(data.file_system_version, "1.1");
        assert_eq!(data.decode::<u32>(), Some(2));
    }
}
