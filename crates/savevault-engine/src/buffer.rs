//! Pending write payloads.

use std::path::PathBuf;

/// A pending write: the full payload destined for one backend path.
///
/// Buffers hold plaintext; the cipher pass happens when the buffer is
/// handed to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBuffer {
    /// Backend path the payload will be written to.
    pub path: PathBuf,
    /// Serialized plaintext payload.
    pub data: String,
}

impl FileBuffer {
    /// Create a buffer for `path` holding `data`.
    pub fn new(path: impl Into<PathBuf>, data: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
        }
    }

    /// A buffer is valid when it names a path and carries a payload.
    pub fn is_valid(&self) -> bool {
        !self.path.as_os_str().is_empty() && !self.data.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity() {
        assert!(FileBuffer::new("slot0/x.sav", "{}").is_valid());
        assert!(!FileBuffer::new("slot0/x.sav", "  ").is_valid());
        assert!(!FileBuffer::new("", "{}").is_valid());
    }
}
